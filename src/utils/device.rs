//! Compute-device selection for the synthesis and alignment models.

use once_cell::sync::OnceCell;

static DEVICE: OnceCell<&'static str> = OnceCell::new();

/// Preferred compute device, decided once at first use and cached for the
/// lifetime of the process. Switching hardware mid-process is not supported.
pub fn preferred_device() -> &'static str {
    DEVICE.get_or_init(|| {
        if which::which("nvidia-smi").is_ok() {
            log::info!("CUDA device detected, models will run on GPU");
            "cuda"
        } else {
            log::info!("No CUDA device detected, models will run on CPU");
            "cpu"
        }
    })
}
