//! Win32 Backends
//!
//! Display configuration (`QueryDisplayConfig`), legacy display settings
//! (`EnumDisplaySettingsW` / `ChangeDisplaySettingsExW`) and window
//! operations over the `windows` crate.

use std::ffi::c_void;
use tracing::{debug, trace};
use windows::core::PCWSTR;
use windows::Win32::Devices::Display::{
    DisplayConfigGetDeviceInfo, GetDisplayConfigBufferSizes, QueryDisplayConfig,
    DISPLAYCONFIG_DEVICE_INFO_GET_SOURCE_NAME, DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME,
    DISPLAYCONFIG_DEVICE_INFO_HEADER, DISPLAYCONFIG_DEVICE_INFO_TYPE, DISPLAYCONFIG_MODE_INFO,
    DISPLAYCONFIG_MODE_INFO_TYPE_DESKTOP_IMAGE, DISPLAYCONFIG_MODE_INFO_TYPE_SOURCE,
    DISPLAYCONFIG_PATH_INFO, DISPLAYCONFIG_SOURCE_DEVICE_NAME, DISPLAYCONFIG_TARGET_DEVICE_NAME,
    QUERY_DISPLAY_CONFIG_FLAGS,
};
use windows::Win32::Foundation::{ERROR_SUCCESS, HWND, LUID, WIN32_ERROR};
use windows::Win32::Graphics::Gdi::{
    ChangeDisplaySettingsExW, EnumDisplayDevicesW, EnumDisplaySettingsW, CDS_TYPE,
    CDS_UPDATEREGISTRY, DEVMODEW, DEVMODE_DISPLAY_ORIENTATION, DISPLAYCONFIG_PATH_ACTIVE,
    DISPLAY_DEVICEW, DISPLAY_DEVICE_ATTACHED_TO_DESKTOP, DM_DISPLAYORIENTATION, DM_PELSHEIGHT,
    DM_PELSWIDTH, ENUM_CURRENT_SETTINGS,
};
use windows::Win32::UI::HiDpi::GetDpiForWindow;
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowTextLengthW, GetWindowTextW, IsWindow, SetForegroundWindow,
    SetWindowPos, ShowWindow, SET_WINDOW_POS_FLAGS, SW_MAXIMIZE, SWP_NOACTIVATE, SWP_NOZORDER,
};

use crate::display::{
    ApplyCode, BufferSizes, DisplayConfigBackend, LegacyDevice, LegacyDisplayBackend, LegacyMode,
    ModeUpdate, NativeError, PathEndpoint, PixelRect, QueryStrategy, RawMode, RawModeKind,
    RawPath, RawTopology, TargetDeviceName,
};
use crate::placement::{ClosedCallback, MoveFlag, MoveFlags, WatchId, WindowHandle, WindowHost};

fn pack_luid(luid: LUID) -> u64 {
    ((luid.HighPart as u32 as u64) << 32) | luid.LowPart as u64
}

fn unpack_luid(adapter_id: u64) -> LUID {
    LUID {
        LowPart: adapter_id as u32,
        HighPart: (adapter_id >> 32) as u32 as i32,
    }
}

fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn check(result: WIN32_ERROR) -> Result<(), NativeError> {
    if result == ERROR_SUCCESS {
        Ok(())
    } else {
        Err(NativeError(result.0 as i32))
    }
}

fn header<T>(kind: DISPLAYCONFIG_DEVICE_INFO_TYPE, endpoint: PathEndpoint) -> DISPLAYCONFIG_DEVICE_INFO_HEADER {
    DISPLAYCONFIG_DEVICE_INFO_HEADER {
        r#type: kind,
        size: std::mem::size_of::<T>() as u32,
        adapterId: unpack_luid(endpoint.adapter_id),
        id: endpoint.id,
    }
}

/// Display-configuration and legacy display-settings APIs
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32DisplayBackend;

impl Win32DisplayBackend {
    /// Create the backend
    pub fn new() -> Self {
        Self
    }

    fn current_devmode(device: &str) -> Result<DEVMODEW, NativeError> {
        let name = to_wide(device);
        let mut mode = DEVMODEW {
            dmSize: std::mem::size_of::<DEVMODEW>() as u16,
            ..Default::default()
        };

        // SAFETY: `name` is NUL-terminated and `mode` is a properly sized out-param
        let ok = unsafe { EnumDisplaySettingsW(PCWSTR(name.as_ptr()), ENUM_CURRENT_SETTINGS, &mut mode) };
        if ok.as_bool() {
            Ok(mode)
        } else {
            Err(NativeError::GEN_FAILURE)
        }
    }
}

impl DisplayConfigBackend for Win32DisplayBackend {
    fn buffer_sizes(&self, strategy: QueryStrategy) -> Result<BufferSizes, NativeError> {
        let mut paths = 0u32;
        let mut modes = 0u32;
        // SAFETY: both out-params are valid u32s
        let result = unsafe {
            GetDisplayConfigBufferSizes(QUERY_DISPLAY_CONFIG_FLAGS(strategy.flags()), &mut paths, &mut modes)
        };
        check(result)?;
        Ok(BufferSizes { paths, modes })
    }

    fn query(&self, strategy: QueryStrategy, sizes: BufferSizes) -> Result<RawTopology, NativeError> {
        let mut path_count = sizes.paths;
        let mut mode_count = sizes.modes;
        let mut paths = vec![DISPLAYCONFIG_PATH_INFO::default(); path_count as usize];
        let mut modes = vec![DISPLAYCONFIG_MODE_INFO::default(); mode_count as usize];

        // SAFETY: the buffers hold exactly the counts passed in
        let result = unsafe {
            QueryDisplayConfig(
                QUERY_DISPLAY_CONFIG_FLAGS(strategy.flags()),
                &mut path_count,
                paths.as_mut_ptr(),
                &mut mode_count,
                modes.as_mut_ptr(),
                None,
            )
        };
        check(result)?;

        paths.truncate(path_count as usize);
        modes.truncate(mode_count as usize);

        let raw_paths = paths
            .iter()
            .map(|p| RawPath {
                source: PathEndpoint {
                    adapter_id: pack_luid(p.sourceInfo.adapterId),
                    id: p.sourceInfo.id,
                },
                target: PathEndpoint {
                    adapter_id: pack_luid(p.targetInfo.adapterId),
                    id: p.targetInfo.id,
                },
                active: p.flags & DISPLAYCONFIG_PATH_ACTIVE != 0,
            })
            .collect();

        let raw_modes = modes
            .iter()
            .map(|m| {
                let kind = match m.infoType {
                    DISPLAYCONFIG_MODE_INFO_TYPE_SOURCE => {
                        // SAFETY: infoType selects the sourceMode variant
                        let source = unsafe { m.Anonymous.sourceMode };
                        RawModeKind::Source {
                            x: source.position.x,
                            y: source.position.y,
                            width: source.width,
                            height: source.height,
                        }
                    }
                    DISPLAYCONFIG_MODE_INFO_TYPE_DESKTOP_IMAGE => RawModeKind::DesktopImage,
                    _ => RawModeKind::Target,
                };
                RawMode {
                    endpoint: PathEndpoint {
                        adapter_id: pack_luid(m.adapterId),
                        id: m.id,
                    },
                    kind,
                }
            })
            .collect();

        Ok(RawTopology {
            paths: raw_paths,
            modes: raw_modes,
        })
    }

    fn source_name(&self, source: PathEndpoint) -> Result<String, NativeError> {
        let mut name = DISPLAYCONFIG_SOURCE_DEVICE_NAME {
            header: header::<DISPLAYCONFIG_SOURCE_DEVICE_NAME>(DISPLAYCONFIG_DEVICE_INFO_GET_SOURCE_NAME, source),
            ..Default::default()
        };

        // SAFETY: header.size matches the struct the header is embedded in
        let result = unsafe { DisplayConfigGetDeviceInfo(&mut name.header) };
        if result != 0 {
            return Err(NativeError(result));
        }
        Ok(from_wide(&name.viewGdiDeviceName))
    }

    fn target_name(&self, target: PathEndpoint) -> Result<TargetDeviceName, NativeError> {
        let mut name = DISPLAYCONFIG_TARGET_DEVICE_NAME {
            header: header::<DISPLAYCONFIG_TARGET_DEVICE_NAME>(DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME, target),
            ..Default::default()
        };

        // SAFETY: header.size matches the struct the header is embedded in
        let result = unsafe { DisplayConfigGetDeviceInfo(&mut name.header) };
        if result != 0 {
            return Err(NativeError(result));
        }

        // SAFETY: every view of the flags union is a plain u32
        let flags = unsafe { name.flags.Anonymous.value };

        Ok(TargetDeviceName::from_native(
            from_wide(&name.monitorFriendlyDeviceName),
            from_wide(&name.monitorDevicePath),
            flags,
            name.edidManufactureId,
            name.edidProductCodeId,
        ))
    }
}

impl LegacyDisplayBackend for Win32DisplayBackend {
    fn devices(&self) -> Vec<LegacyDevice> {
        let mut devices = Vec::new();

        for index in 0.. {
            let mut device = DISPLAY_DEVICEW {
                cb: std::mem::size_of::<DISPLAY_DEVICEW>() as u32,
                ..Default::default()
            };
            // SAFETY: `device.cb` is set; a null device name enumerates adapters
            let ok = unsafe { EnumDisplayDevicesW(PCWSTR::null(), index, &mut device, 0) };
            if !ok.as_bool() {
                break;
            }
            if device.StateFlags.0 & DISPLAY_DEVICE_ATTACHED_TO_DESKTOP.0 == 0 {
                continue;
            }

            let name = from_wide(&device.DeviceName);
            let Ok(mode) = Self::current_devmode(&name) else {
                trace!("No current settings for {}", name);
                continue;
            };

            // SAFETY: display devices populate the display variant of the union
            let position = unsafe { mode.Anonymous1.Anonymous2.dmPosition };
            devices.push(LegacyDevice {
                name,
                bounds: PixelRect::from_origin_size(
                    position.x,
                    position.y,
                    mode.dmPelsWidth as i32,
                    mode.dmPelsHeight as i32,
                ),
            });
        }

        devices
    }

    fn current_mode(&self, device: &str) -> Result<LegacyMode, NativeError> {
        let mode = Self::current_devmode(device)?;
        // SAFETY: display devices populate the display variant of the union
        let orientation = unsafe { mode.Anonymous1.Anonymous2.dmDisplayOrientation };
        Ok(LegacyMode {
            width: mode.dmPelsWidth,
            height: mode.dmPelsHeight,
            orientation: orientation.0,
        })
    }

    fn apply_mode(&self, device: &str, update: &ModeUpdate, persist: bool) -> ApplyCode {
        let mut mode = match Self::current_devmode(device) {
            Ok(mode) => mode,
            Err(_) => return ApplyCode::BAD_PARAM,
        };

        mode.dmFields = DM_DISPLAYORIENTATION | DM_PELSWIDTH | DM_PELSHEIGHT;
        mode.dmPelsWidth = update.width;
        mode.dmPelsHeight = update.height;
        mode.Anonymous1.Anonymous2.dmDisplayOrientation =
            DEVMODE_DISPLAY_ORIENTATION(update.orientation.legacy_value());

        let flags = if persist { CDS_UPDATEREGISTRY } else { CDS_TYPE(0) };
        let name = to_wide(device);

        // SAFETY: `name` is NUL-terminated and `mode` outlives the call
        let result = unsafe {
            ChangeDisplaySettingsExW(PCWSTR(name.as_ptr()), Some(&mode as *const DEVMODEW), HWND::default(), flags, None)
        };
        debug!("ChangeDisplaySettingsExW({}) -> {}", device, result.0);
        ApplyCode(result.0)
    }
}

/// Top-level window operations
///
/// Window destruction cannot be observed without a hook on the owning UI
/// thread, so `watch_closed` always declines and the tracker reaps lazily.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32WindowHost;

impl Win32WindowHost {
    /// Create the host
    pub fn new() -> Self {
        Self
    }
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as usize as *mut c_void)
}

/// Maximizing activates the window, which a non-activating move must undo
fn restores_focus_after_maximize(flags: MoveFlags) -> bool {
    flags.contains(MoveFlag::Maximize | MoveFlag::NoActivate)
}

impl WindowHost for Win32WindowHost {
    fn is_window_alive(&self, window: WindowHandle) -> bool {
        // SAFETY: IsWindow accepts any value
        unsafe { IsWindow(hwnd(window)).as_bool() }
    }

    fn window_title(&self, window: WindowHandle) -> Option<String> {
        // SAFETY: the buffer length is passed through the slice
        unsafe {
            let len = GetWindowTextLengthW(hwnd(window));
            if len <= 0 {
                return None;
            }
            let mut buf = vec![0u16; len as usize + 1];
            let copied = GetWindowTextW(hwnd(window), &mut buf);
            (copied > 0).then(|| String::from_utf16_lossy(&buf[..copied as usize]))
        }
    }

    fn scale_factor(&self, window: WindowHandle) -> f64 {
        // SAFETY: returns 0 for an invalid handle
        let dpi = unsafe { GetDpiForWindow(hwnd(window)) };
        if dpi == 0 {
            1.0
        } else {
            dpi as f64 / 96.0
        }
    }

    fn move_window(&self, window: WindowHandle, rect: PixelRect, flags: MoveFlags) -> Result<(), NativeError> {
        let mut swp = SET_WINDOW_POS_FLAGS(0);
        if flags.contains(MoveFlag::NoZOrder) {
            swp |= SWP_NOZORDER;
        }
        if flags.contains(MoveFlag::NoActivate) {
            swp |= SWP_NOACTIVATE;
        }

        // SAFETY: an invalid handle makes SetWindowPos fail, which is reported
        unsafe {
            SetWindowPos(
                hwnd(window),
                HWND::default(),
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                swp,
            )
            .map_err(|e| NativeError(e.code().0))?;

            if flags.contains(MoveFlag::Maximize) {
                let foreground = GetForegroundWindow();
                let _ = ShowWindow(hwnd(window), SW_MAXIMIZE);

                // No show command maximizes without activating; hand focus back
                if restores_focus_after_maximize(flags)
                    && !foreground.is_invalid()
                    && foreground != hwnd(window)
                {
                    let _ = SetForegroundWindow(foreground);
                }
            }
        }
        Ok(())
    }

    fn watch_closed(&self, _window: WindowHandle, _callback: ClosedCallback) -> Option<WatchId> {
        None
    }

    fn unwatch(&self, _id: WatchId) {}
}
