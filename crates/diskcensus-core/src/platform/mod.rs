/// Platform-specific functionality: the Windows attribute probes and the
/// elevation check. Elsewhere both degrade to "nothing known".
#[cfg(windows)]
mod permissions;
#[cfg(windows)]
mod win;

use crate::attributes::AttributeSource;
#[cfg(not(windows))]
use crate::attributes::NullAttributeSource;

#[cfg(windows)]
pub use win::WindowsAttributeSource;

/// The attribute source for the current platform.
pub fn default_source() -> Box<dyn AttributeSource> {
    #[cfg(windows)]
    {
        Box::new(WindowsAttributeSource::new())
    }
    #[cfg(not(windows))]
    {
        Box::new(NullAttributeSource)
    }
}

/// Whether the process runs with administrator rights.
///
/// The tool refuses most detail queries without them, so callers warn
/// before a run. Always `false` off Windows.
pub fn is_elevated() -> bool {
    #[cfg(windows)]
    {
        permissions::is_elevated()
    }
    #[cfg(not(windows))]
    {
        false
    }
}
