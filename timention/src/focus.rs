/// Raising the overlay above everything else and pulling keyboard focus to it.
///
/// On Windows the overlay lives in the console window, so presenting means
/// maximising that window, marking it topmost and asking for the foreground.
/// Windows may refuse the foreground request (e.g. when another application
/// is holding input), which is reported as [`FocusError::Refused`]; the
/// overlay is still shown and a click gives it focus.
///
/// On other platforms the terminal emulator owns its window and focus, and
/// both functions succeed as no-ops.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[cfg_attr(not(windows), allow(dead_code))]
pub enum FocusError {
    #[error("no console window is attached to this process")]
    NoWindow,
    #[error("the window manager refused to move the overlay to the foreground")]
    Refused,
}

// ── Windows implementation ─────────────────────────────────────────────────────

#[cfg(windows)]
mod imp {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::System::Console::GetConsoleWindow;
    use windows::Win32::UI::WindowsAndMessaging::{
        SetForegroundWindow, SetWindowPos, ShowWindow, HWND_NOTOPMOST, HWND_TOPMOST,
        SWP_NOMOVE, SWP_NOSIZE, SW_MAXIMIZE,
    };

    use super::FocusError;

    fn console_window() -> Result<HWND, FocusError> {
        let hwnd = unsafe { GetConsoleWindow() };
        if hwnd == HWND::default() {
            return Err(FocusError::NoWindow);
        }
        Ok(hwnd)
    }

    pub fn raise() -> Result<(), FocusError> {
        let hwnd = console_window()?;
        unsafe {
            let _ = ShowWindow(hwnd, SW_MAXIMIZE);
            // Topmost is cosmetic; the foreground request below decides the outcome.
            let _ = SetWindowPos(hwnd, HWND_TOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE);
            if SetForegroundWindow(hwnd).as_bool() {
                Ok(())
            } else {
                Err(FocusError::Refused)
            }
        }
    }

    pub fn release() {
        if let Ok(hwnd) = console_window() {
            unsafe {
                let _ = SetWindowPos(hwnd, HWND_NOTOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE);
            }
        }
    }
}

// ── Public API ─────────────────────────────────────────────────────────────────

/// Makes the overlay window topmost and requests keyboard focus for it.
pub fn raise() -> Result<(), FocusError> {
    #[cfg(windows)]
    {
        imp::raise()
    }
    #[cfg(not(windows))]
    {
        Ok(())
    }
}

/// Drops the topmost flag set by [`raise`].
pub fn release() {
    #[cfg(windows)]
    imp::release();
}
