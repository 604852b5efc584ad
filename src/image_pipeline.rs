//! Decodes an instance's first frame into an iced image handle.

use std::path::Path;

use dicom::object::open_file;
use dicom::pixeldata::{
    DecodedPixelData, PhotometricInterpretation, PixelDecoder, PlanarConfiguration,
};
use iced::widget::image::Handle;

pub struct FramePreview;

impl FramePreview {
    /// Opens the instance file and renders its first frame, if any.
    pub fn render_file(path: &Path) -> Result<Option<Handle>, String> {
        let object = open_file(path)
            .map_err(|err| format!("{}: failed to open DICOM file ({err})", path.display()))?;

        let decoded = object
            .decode_pixel_data()
            .map_err(|err| format!("Failed to decode pixel data: {err}"))?;

        if decoded.number_of_frames() == 0 {
            return Ok(None);
        }

        Self::frame_to_handle(&decoded, 0).map(Some)
    }

    fn frame_to_handle(decoded: &DecodedPixelData<'_>, frame_idx: u32) -> Result<Handle, String> {
        match decoded.photometric_interpretation() {
            photometric if photometric.is_monochrome() => {
                Self::monochrome_to_handle(decoded, frame_idx)
            }
            PhotometricInterpretation::Rgb
                if decoded.bits_allocated() <= 8
                    && matches!(
                        decoded.planar_configuration(),
                        PlanarConfiguration::Standard
                    ) =>
            {
                Self::rgb_to_handle(decoded, frame_idx)
            }
            other => Self::fallback_to_dynamic(decoded, frame_idx, other.as_str()),
        }
    }

    fn monochrome_to_handle(
        decoded: &DecodedPixelData<'_>,
        frame_idx: u32,
    ) -> Result<Handle, String> {
        let width = decoded.columns();
        let height = decoded.rows();
        let invert = matches!(
            decoded.photometric_interpretation(),
            PhotometricInterpretation::Monochrome1
        );

        if decoded.bits_allocated() <= 8 {
            let samples = decoded
                .to_vec_frame::<u8>(frame_idx)
                .map_err(|err| format!("Failed to materialize frame data: {err}"))?;
            let mut rgba = Vec::with_capacity(samples.len() * 4);
            for &gray in &samples {
                let value = if invert {
                    255u8.saturating_sub(gray)
                } else {
                    gray
                };
                rgba.extend_from_slice(&[value, value, value, 255]);
            }
            return Ok(Handle::from_rgba(width, height, rgba));
        }

        let samples = decoded
            .to_vec_frame::<u16>(frame_idx)
            .map_err(|err| format!("Failed to materialize frame data: {err}"))?;
        let (min, max) = min_max_u16(&samples).unwrap_or((0, 0));
        let mut rgba = Vec::with_capacity(samples.len() * 4);
        for &value in &samples {
            let mut gray = normalize_u16(value, min, max);
            if invert {
                gray = 255 - gray;
            }
            rgba.extend_from_slice(&[gray, gray, gray, 255]);
        }
        Ok(Handle::from_rgba(width, height, rgba))
    }

    fn rgb_to_handle(decoded: &DecodedPixelData<'_>, frame_idx: u32) -> Result<Handle, String> {
        let width = decoded.columns();
        let height = decoded.rows();

        let samples = decoded
            .to_vec_frame::<u8>(frame_idx)
            .map_err(|err| format!("Failed to materialize RGB frame: {err}"))?;
        if !samples.len().is_multiple_of(3) {
            return Err(format!(
                "RGB buffer length {} is not divisible by 3",
                samples.len()
            ));
        }

        let mut rgba = Vec::with_capacity(samples.len() / 3 * 4);
        for chunk in samples.chunks(3) {
            if let [r, g, b] = *chunk {
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        }
        Ok(Handle::from_rgba(width, height, rgba))
    }

    fn fallback_to_dynamic(
        decoded: &DecodedPixelData<'_>,
        frame_idx: u32,
        interpretation: &str,
    ) -> Result<Handle, String> {
        decoded
            .to_dynamic_image(frame_idx)
            .map_err(|err| {
                format!("Unsupported photometric interpretation `{interpretation}`: {err}")
            })
            .map(|image| {
                let rgba = image.into_rgba8();
                let (width, height) = rgba.dimensions();
                Handle::from_rgba(width, height, rgba.into_raw())
            })
    }
}

fn min_max_u16(values: &[u16]) -> Option<(u16, u16)> {
    values.iter().copied().fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

fn normalize_u16(value: u16, min: u16, max: u16) -> u8 {
    if max <= min {
        return 0;
    }

    let range = (max - min) as f32;
    let normalized = (value.saturating_sub(min)) as f32 / range;
    (normalized * 255.0).clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_maps_the_window_onto_the_byte_range() {
        assert_eq!(normalize_u16(100, 100, 300), 0);
        assert_eq!(normalize_u16(300, 100, 300), 255);
        assert_eq!(normalize_u16(200, 100, 300), 128);
        // Degenerate window collapses to black instead of dividing by zero.
        assert_eq!(normalize_u16(42, 42, 42), 0);
    }

    #[test]
    fn min_max_handles_empty_input() {
        assert_eq!(min_max_u16(&[]), None);
        assert_eq!(min_max_u16(&[7, 3, 9]), Some((3, 9)));
    }
}
