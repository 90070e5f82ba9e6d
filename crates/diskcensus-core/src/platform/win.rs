/// Windows attribute probes: device IOCTLs for disk flags and the registry
/// for the pagefile and crash dump configuration.
use crate::attributes::paths::{drive_letter_of, expand_env, parse_paging_entry};
use crate::attributes::{AttributeSource, DiskProperties, ProbeError};
use std::collections::HashMap;
use std::ffi::c_void;
use std::path::PathBuf;
use tracing::debug;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, ERROR_WRITE_PROTECT, HANDLE};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, GetLogicalDrives, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::Registry::{
    RegGetValueW, HKEY_LOCAL_MACHINE, REG_ROUTINE_FLAGS, RRF_NOEXPAND, RRF_RT_REG_DWORD,
    RRF_RT_REG_EXPAND_SZ, RRF_RT_REG_MULTI_SZ, RRF_RT_REG_SZ,
};
use windows::Win32::System::SystemInformation::GetWindowsDirectoryW;
use windows::Win32::System::IO::DeviceIoControl;

// Control codes, all FILE_ANY_ACCESS so a query-only handle is enough.
const IOCTL_STORAGE_GET_DEVICE_NUMBER: u32 = 0x002D_1080;
const IOCTL_DISK_IS_WRITABLE: u32 = 0x0007_0024;
const IOCTL_DISK_GET_DISK_ATTRIBUTES: u32 = 0x0007_00F0;
const IOCTL_DISK_IS_CLUSTERED: u32 = 0x0007_00F8;

const DISK_ATTRIBUTE_READ_ONLY: u64 = 0x2;

const MEMORY_MANAGEMENT_KEY: &str =
    r"SYSTEM\CurrentControlSet\Control\Session Manager\Memory Management";
const CRASH_CONTROL_KEY: &str = r"SYSTEM\CurrentControlSet\Control\CrashControl";

/// Probes the live system. Holds no state; the fuser caches per run.
#[derive(Debug, Default)]
pub struct WindowsAttributeSource;

impl WindowsAttributeSource {
    pub fn new() -> Self {
        Self
    }
}

/// Closes the wrapped handle on drop.
struct OwnedHandle(HANDLE);

impl OwnedHandle {
    /// Open a device path for IOCTL queries only.
    fn open_device(path: &str) -> windows::core::Result<Self> {
        let name = wide(path);
        // SAFETY: `name` is NUL-terminated and outlives the call.
        let handle = unsafe {
            CreateFileW(
                PCWSTR(name.as_ptr()),
                0,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                None,
                OPEN_EXISTING,
                Default::default(),
                None,
            )?
        };
        Ok(Self(handle))
    }

    /// Issue an output-only IOCTL, returning the bytes written.
    fn query(&self, code: u32, out: &mut [u8]) -> windows::core::Result<usize> {
        let mut returned = 0u32;
        // SAFETY: the handle is open and `out` is valid for its length.
        unsafe {
            DeviceIoControl(
                self.0,
                code,
                None,
                0,
                Some(out.as_mut_ptr() as *mut c_void),
                out.len() as u32,
                Some(&mut returned),
                None,
            )?;
        }
        Ok(returned as usize)
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from CreateFileW and is closed only here.
        let _ = unsafe { CloseHandle(self.0) };
    }
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    buf.get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
}

fn read_u64(buf: &[u8], offset: usize) -> Option<u64> {
    buf.get(offset..offset + 8)
        .and_then(|b| b.try_into().ok())
        .map(u64::from_le_bytes)
}

fn query_error(what: &'static str, e: windows::core::Error) -> ProbeError {
    ProbeError::Query {
        what,
        detail: e.message(),
    }
}

/// Drive letter of the Windows directory.
fn system_drive() -> Option<char> {
    let mut buf = [0u16; 260];
    // SAFETY: the buffer length is passed with the slice.
    let len = unsafe { GetWindowsDirectoryW(Some(&mut buf)) } as usize;
    if len == 0 || len > buf.len() {
        return None;
    }
    drive_letter_of(&PathBuf::from(String::from_utf16_lossy(&buf[..len])))
}

/// Disk number behind a drive letter, `None` for anything that is not a
/// local disk volume.
fn disk_of_letter(letter: char) -> Option<u32> {
    let handle = OwnedHandle::open_device(&format!(r"\\.\{letter}:")).ok()?;
    // STORAGE_DEVICE_NUMBER { DeviceType, DeviceNumber, PartitionNumber }.
    let mut out = [0u8; 12];
    match handle.query(IOCTL_STORAGE_GET_DEVICE_NUMBER, &mut out) {
        Ok(n) if n >= 8 => read_u32(&out, 4),
        Ok(_) => None,
        Err(e) => {
            debug!(%letter, error = %e, "no device number for drive");
            None
        }
    }
}

enum RegValue {
    Dword(u32),
    Strings(Vec<String>),
}

/// Read one HKLM value. `Ok(None)` when the value does not exist.
fn read_registry(
    key: &str,
    value: &str,
    flags: REG_ROUTINE_FLAGS,
) -> Result<Option<RegValue>, ProbeError> {
    let key_w = wide(key);
    let value_w = wide(value);
    let mut buf = vec![0u8; 4096];
    let mut len = buf.len() as u32;
    // SAFETY: both names are NUL-terminated; `len` holds the buffer size.
    let status = unsafe {
        RegGetValueW(
            HKEY_LOCAL_MACHINE,
            PCWSTR(key_w.as_ptr()),
            PCWSTR(value_w.as_ptr()),
            flags,
            None,
            Some(buf.as_mut_ptr() as *mut c_void),
            Some(&mut len),
        )
    };
    if let Err(e) = status.ok() {
        debug!(key, value, error = %e, "registry value unavailable");
        return Ok(None);
    }
    buf.truncate(len as usize);

    if flags == RRF_RT_REG_DWORD {
        return Ok(read_u32(&buf, 0).map(RegValue::Dword));
    }
    let units: Vec<u16> = buf
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let strings = units
        .split(|&u| u == 0)
        .filter(|s| !s.is_empty())
        .map(String::from_utf16_lossy)
        .collect();
    Ok(Some(RegValue::Strings(strings)))
}

fn registry_strings(
    key: &str,
    value: &str,
    flags: REG_ROUTINE_FLAGS,
) -> Result<Vec<String>, ProbeError> {
    Ok(match read_registry(key, value, flags)? {
        Some(RegValue::Strings(s)) => s,
        _ => Vec::new(),
    })
}

fn registry_dword(key: &str, value: &str) -> Result<Option<u32>, ProbeError> {
    Ok(match read_registry(key, value, RRF_RT_REG_DWORD)? {
        Some(RegValue::Dword(v)) => Some(v),
        _ => None,
    })
}

impl AttributeSource for WindowsAttributeSource {
    fn disk_properties(&self, disk: u32) -> Result<Option<DiskProperties>, ProbeError> {
        let handle = match OwnedHandle::open_device(&format!(r"\\.\PhysicalDrive{disk}")) {
            Ok(h) => h,
            Err(e) => {
                debug!(disk, error = %e, "cannot open physical drive");
                return Ok(None);
            }
        };

        let mut props = DiskProperties::default();

        // GET_DISK_ATTRIBUTES { Version, Reserved1, Attributes: u64 }.
        let mut attrs = [0u8; 16];
        match handle.query(IOCTL_DISK_GET_DISK_ATTRIBUTES, &mut attrs) {
            Ok(_) => {
                props.is_read_only = read_u64(&attrs, 8).map(|a| a & DISK_ATTRIBUTE_READ_ONLY != 0);
            }
            Err(e) => debug!(disk, error = %e, "disk attributes query failed"),
        }

        props.is_current_read_only = match handle.query(IOCTL_DISK_IS_WRITABLE, &mut []) {
            Ok(_) => Some(false),
            Err(e) if e.code() == ERROR_WRITE_PROTECT.to_hresult() => Some(true),
            Err(e) => {
                debug!(disk, error = %e, "writability query failed");
                None
            }
        };

        let mut clustered = [0u8; 1];
        props.is_clustered = match handle.query(IOCTL_DISK_IS_CLUSTERED, &mut clustered) {
            Ok(n) if n >= 1 => Some(clustered[0] != 0),
            Ok(_) => None,
            Err(e) => {
                debug!(disk, error = %e, "cluster query failed");
                None
            }
        };

        props.is_boot = system_drive()
            .and_then(disk_of_letter)
            .map(|boot| boot == disk);

        Ok(Some(props))
    }

    fn drive_letters(&self) -> Result<HashMap<char, u32>, ProbeError> {
        // SAFETY: no arguments; returns a bitmask.
        let mask = unsafe { GetLogicalDrives() };
        if mask == 0 {
            return Err(query_error("GetLogicalDrives", windows::core::Error::from_win32()));
        }
        Ok(('A'..='Z')
            .enumerate()
            .filter(|(idx, _)| mask & (1u32 << idx) != 0)
            .filter_map(|(_, letter)| disk_of_letter(letter).map(|disk| (letter, disk)))
            .collect())
    }

    fn pagefile_paths(&self) -> Result<Vec<PathBuf>, ProbeError> {
        // ExistingPageFiles lists the files in use; PagingFiles the
        // configuration, consulted when the former is absent.
        let mut entries =
            registry_strings(MEMORY_MANAGEMENT_KEY, "ExistingPageFiles", RRF_RT_REG_MULTI_SZ)?;
        if entries.is_empty() {
            entries = registry_strings(MEMORY_MANAGEMENT_KEY, "PagingFiles", RRF_RT_REG_MULTI_SZ)?;
        }
        let system = system_drive();
        Ok(entries
            .iter()
            .filter_map(|e| parse_paging_entry(e, system))
            .collect())
    }

    fn hibernation_file(&self) -> Result<Option<PathBuf>, ProbeError> {
        let Some(letter) = system_drive() else {
            return Err(ProbeError::Query {
                what: "system drive",
                detail: "Windows directory has no drive letter".into(),
            });
        };
        let path = PathBuf::from(format!(r"{letter}:\hiberfil.sys"));
        Ok(path.try_exists()?.then_some(path))
    }

    fn crashdump_paths(&self) -> Result<Vec<PathBuf>, ProbeError> {
        if registry_dword(CRASH_CONTROL_KEY, "CrashDumpEnabled")?.unwrap_or(0) == 0 {
            return Ok(Vec::new());
        }
        let raw = registry_strings(
            CRASH_CONTROL_KEY,
            "DumpFile",
            RRF_RT_REG_SZ | RRF_RT_REG_EXPAND_SZ | RRF_NOEXPAND,
        )?;
        Ok(raw
            .iter()
            .map(|p| PathBuf::from(expand_env(p, |name| std::env::var(name).ok())))
            .collect())
    }
}
