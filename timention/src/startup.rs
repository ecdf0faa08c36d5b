/// Launch-at-login registration via the `HKCU\...\Run` registry key.
///
/// Applied on every start from the `launch_on_startup` setting: `true`
/// (re-)registers the running executable, `false` removes any earlier
/// registration. Both directions are idempotent.
///
/// On non-Windows platforms this compiles and succeeds as a no-op.
use anyhow::Result;

// ── Windows implementation ─────────────────────────────────────────────────────

#[cfg(windows)]
mod imp {
    use anyhow::{bail, Result};
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
    use windows::Win32::System::Registry::{
        RegCloseKey, RegCreateKeyExW, RegDeleteValueW, RegOpenKeyExW, RegSetValueExW, HKEY,
        HKEY_CURRENT_USER, KEY_SET_VALUE, REG_OPTION_NON_VOLATILE, REG_SZ,
    };

    const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";
    const VALUE_NAME: &str = "Timention";

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    /// Writes `"<exe_path>"` (quoted, so paths with spaces survive) under
    /// `HKCU\...\Run\Timention`.
    pub fn register(exe_path: &str) -> Result<()> {
        let key_w = to_wide(RUN_KEY);
        let val_w = to_wide(VALUE_NAME);
        let data_w = to_wide(&format!("\"{exe_path}\""));
        let data_bytes: Vec<u8> = data_w.iter().flat_map(|c| c.to_le_bytes()).collect();

        let mut hkey = HKEY::default();
        let err = unsafe {
            RegCreateKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(key_w.as_ptr()),
                0,
                PCWSTR::null(),
                REG_OPTION_NON_VOLATILE,
                KEY_SET_VALUE,
                None,
                &mut hkey,
                None,
            )
        };
        if err != ERROR_SUCCESS {
            bail!("RegCreateKeyExW failed: {:?}", err);
        }

        let err = unsafe {
            RegSetValueExW(
                hkey,
                PCWSTR::from_raw(val_w.as_ptr()),
                0,
                REG_SZ,
                Some(&data_bytes),
            )
        };
        unsafe {
            let _ = RegCloseKey(hkey);
        }

        if err != ERROR_SUCCESS {
            bail!("RegSetValueExW failed: {:?}", err);
        }
        Ok(())
    }

    /// Removes the `Timention` value. Absent key or value counts as success.
    pub fn unregister() -> Result<()> {
        let key_w = to_wide(RUN_KEY);
        let val_w = to_wide(VALUE_NAME);

        let mut hkey = HKEY::default();
        let err = unsafe {
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(key_w.as_ptr()),
                0,
                KEY_SET_VALUE,
                &mut hkey,
            )
        };
        if err != ERROR_SUCCESS {
            return Ok(());
        }

        let err = unsafe { RegDeleteValueW(hkey, PCWSTR::from_raw(val_w.as_ptr())) };
        unsafe {
            let _ = RegCloseKey(hkey);
        }

        if err != ERROR_SUCCESS && err != ERROR_FILE_NOT_FOUND {
            bail!("RegDeleteValueW failed: {:?}", err);
        }
        Ok(())
    }
}

// ── Public API ─────────────────────────────────────────────────────────────────

/// Makes the login registration match `enabled`.
pub fn apply(enabled: bool) -> Result<()> {
    #[cfg(windows)]
    {
        if enabled {
            let exe = std::env::current_exe()
                .map_err(|e| anyhow::anyhow!("Failed to locate executable: {e}"))?;
            let exe_str = exe.to_string_lossy();
            imp::register(&exe_str)?;
            log::info!("[startup] Registered to launch at login: {exe_str}");
        } else {
            imp::unregister()?;
        }
    }
    #[cfg(not(windows))]
    {
        if enabled {
            log::debug!("[startup] Launch at login is only supported on Windows");
        }
    }
    Ok(())
}

#[cfg(test)]
#[cfg(not(windows))]
mod tests {
    use super::*;

    #[test]
    fn apply_is_a_no_op_off_windows() {
        assert!(apply(true).is_ok());
        assert!(apply(false).is_ok());
    }
}
