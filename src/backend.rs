//! Backend abstraction - compute backend selection
//!
//! The inference backend is selected at compile time: CUDA when the `cuda`
//! feature is enabled, otherwise the NdArray CPU backend. Inference never
//! needs autodiff, so no `Autodiff` wrapper is involved.

#[cfg(feature = "cuda")]
pub type InferenceBackend = burn_cuda::Cuda;

#[cfg(not(feature = "cuda"))]
pub type InferenceBackend = burn::backend::NdArray;

/// Device type of the selected backend
pub type InferenceDevice = <InferenceBackend as burn::tensor::backend::Backend>::Device;

/// Get the default device for the selected backend
pub fn default_device() -> InferenceDevice {
    #[cfg(feature = "cuda")]
    {
        // Default to the first GPU
        burn_cuda::CudaDevice::default()
    }

    #[cfg(not(feature = "cuda"))]
    {
        burn::backend::ndarray::NdArrayDevice::default()
    }
}

/// Get a human-readable name for the current backend
pub fn backend_name() -> &'static str {
    #[cfg(feature = "cuda")]
    {
        "CUDA (GPU)"
    }

    #[cfg(not(feature = "cuda"))]
    {
        "NdArray (CPU)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device() {
        // The fallback backend is always available.
        let _device = default_device();
        assert!(!backend_name().is_empty());
    }
}
