//! Linux ALSA sink
//!
//! 使用 `snd_pcm_set_params` 一次性设置固定参数，阻塞式 `snd_pcm_writei` 写入

use std::ffi::{c_void, CStr, CString};
use std::os::raw::{c_char, c_int, c_uint};
use std::ptr;

use alsa_sys::*;

use super::format::ByteOrder;
use super::output::{AudioSink, DeviceHint, SinkError, SinkParams};

/// 设备错误码对应的描述
pub fn err_code_to_string(code: c_int) -> String {
    unsafe {
        let message = snd_strerror(code);
        if message.is_null() {
            return format!("error {}", code);
        }
        CStr::from_ptr(message).to_string_lossy().into_owned()
    }
}

/// ALSA 回放设备
pub struct AlsaSink {
    pcm: *mut snd_pcm_t,
    device: String,
    channels: usize,
}

unsafe impl Send for AlsaSink {}

impl AlsaSink {
    pub fn new() -> Self {
        Self {
            pcm: ptr::null_mut(),
            device: String::new(),
            channels: 0,
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }
}

impl Default for AlsaSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for AlsaSink {
    fn open(&mut self, device: &str) -> Result<(), SinkError> {
        self.close();

        let name = CString::new(device).map_err(|_| SinkError::Open {
            device: device.to_string(),
            code: -libc::EINVAL,
            reason: "device name contains a NUL byte".to_string(),
        })?;

        let mut pcm = ptr::null_mut();
        let err = unsafe { snd_pcm_open(&mut pcm, name.as_ptr(), SND_PCM_STREAM_PLAYBACK, 0) };
        if err < 0 {
            return Err(SinkError::Open {
                device: device.to_string(),
                code: err,
                reason: err_code_to_string(err),
            });
        }

        self.pcm = pcm;
        self.device = device.to_string();
        log::info!("ALSA: opened playback device '{}'", device);
        Ok(())
    }

    fn set_params(&mut self, params: &SinkParams) -> Result<(), SinkError> {
        if self.pcm.is_null() {
            return Err(SinkError::NotOpen);
        }

        let format = match params.format.order {
            ByteOrder::Little => SND_PCM_FORMAT_S16_LE,
            ByteOrder::Big => SND_PCM_FORMAT_S16_BE,
        };

        let err = unsafe {
            snd_pcm_set_params(
                self.pcm,
                format,
                SND_PCM_ACCESS_RW_INTERLEAVED,
                params.format.channels as c_uint,
                params.format.sample_rate as c_uint,
                params.soft_resample as c_int,
                params.latency_us as c_uint,
            )
        };
        if err < 0 {
            return Err(SinkError::Params {
                code: err,
                reason: err_code_to_string(err),
            });
        }

        self.channels = params.format.channels as usize;
        log::info!(
            "ALSA: S16 {} | {}ch | {}Hz | latency {}us",
            params.format.order.name(),
            params.format.channels,
            params.format.sample_rate,
            params.latency_us
        );
        Ok(())
    }

    fn write_interleaved(&mut self, words: &[u16], frames: usize) -> Result<usize, SinkError> {
        if self.pcm.is_null() || self.channels == 0 {
            return Err(SinkError::NotOpen);
        }

        debug_assert!(words.len() >= frames * self.channels);
        let frames = frames.min(words.len() / self.channels);

        let written = unsafe {
            snd_pcm_writei(
                self.pcm,
                words.as_ptr() as *const c_void,
                frames as snd_pcm_uframes_t,
            )
        };
        if written < 0 {
            let code = written as c_int;
            return Err(SinkError::Write {
                code,
                reason: err_code_to_string(code),
            });
        }
        Ok(written as usize)
    }

    fn recover(&mut self, code: i32, silent: bool) -> Result<(), SinkError> {
        if self.pcm.is_null() {
            return Err(SinkError::NotOpen);
        }

        let err = unsafe { snd_pcm_recover(self.pcm, code, silent as c_int) };
        if err < 0 {
            return Err(SinkError::Recover {
                code: err,
                reason: err_code_to_string(err),
            });
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), SinkError> {
        if self.pcm.is_null() {
            return Err(SinkError::NotOpen);
        }

        let err = unsafe { snd_pcm_drain(self.pcm) };
        if err < 0 {
            return Err(SinkError::Drain {
                code: err,
                reason: err_code_to_string(err),
            });
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.pcm.is_null() {
            return;
        }
        unsafe {
            snd_pcm_close(self.pcm);
        }
        self.pcm = ptr::null_mut();
        self.channels = 0;
        log::debug!("ALSA: closed '{}'", self.device);
    }

    fn is_open(&self) -> bool {
        !self.pcm.is_null()
    }
}

impl Drop for AlsaSink {
    fn drop(&mut self) {
        self.close();
    }
}

/// 取出一个 hint 字段，ALSA 分配的字符串由调用者释放
unsafe fn take_hint(hint: *const c_void, id: &CStr) -> Option<String> {
    let value: *mut c_char = snd_device_name_get_hint(hint, id.as_ptr());
    if value.is_null() {
        return None;
    }
    let text = CStr::from_ptr(value).to_string_lossy().into_owned();
    libc::free(value as *mut libc::c_void);
    Some(text)
}

/// 枚举 PCM 设备（诊断用，与播放无关）
pub fn list_devices() -> Result<Vec<DeviceHint>, SinkError> {
    let iface = c"pcm";
    let name_id = c"NAME";
    let desc_id = c"DESC";
    let ioid_id = c"IOID";

    let mut hints: *mut *mut c_void = ptr::null_mut();
    let err = unsafe { snd_device_name_hint(-1, iface.as_ptr(), &mut hints) };
    if err != 0 {
        return Err(SinkError::Enumerate {
            code: err,
            reason: err_code_to_string(err),
        });
    }

    let mut devices = Vec::new();
    unsafe {
        let mut cursor = hints;
        while !(*cursor).is_null() {
            let hint = *cursor as *const c_void;
            devices.push(DeviceHint {
                name: take_hint(hint, name_id),
                description: take_hint(hint, desc_id),
                io: take_hint(hint, ioid_id),
            });
            cursor = cursor.add(1);
        }
        snd_device_name_free_hint(hints);
    }

    log::debug!("ALSA: {} PCM device hint(s)", devices.len());
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unopened_sink_rejects_io() {
        let mut sink = AlsaSink::new();
        assert!(!sink.is_open());
        assert!(matches!(
            sink.write_interleaved(&[0, 0], 1),
            Err(SinkError::NotOpen)
        ));
        assert!(matches!(sink.drain(), Err(SinkError::NotOpen)));
        assert!(matches!(sink.recover(-32, false), Err(SinkError::NotOpen)));
        // 未打开时 close 不做任何事
        sink.close();
    }

    #[test]
    fn test_nul_in_device_name() {
        let mut sink = AlsaSink::new();
        let err = sink.open("bad\0name").unwrap_err();
        assert_eq!(err.code(), Some(-libc::EINVAL));
    }

    #[test]
    fn test_strerror() {
        assert!(!err_code_to_string(-libc::EPIPE).is_empty());
    }
}
