use image::{GrayImage, Luma};

use crate::detection::segmentation::{BACKGROUND, FOREGROUND};
use crate::error::{FruitError, Result};

/// Median filter for binary masks.
///
/// Each output pixel is the median of the `kernel` x `kernel` window around
/// it. Windows that cross the image border only use the in-bounds pixels.
/// For a binary window of `n` pixels with `b` background pixels the median
/// (element `n / 2` of the sorted window) is foreground iff `b <= n / 2`.
pub fn median_filter_binary(mask: &GrayImage, kernel: u32) -> Result<GrayImage> {
    if kernel == 0 || kernel % 2 == 0 {
        return Err(FruitError::invalid_parameter("median_kernel", kernel));
    }

    let (width, height) = mask.dimensions();
    let (w, h) = (width as usize, height as usize);
    let radius = (kernel / 2) as usize;

    // Summed-area table of foreground pixels, one extra row and column of zeros
    let stride = w + 1;
    let mut integral = vec![0u32; stride * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u32;
        for x in 0..w {
            if mask.get_pixel(x as u32, y as u32)[0] != BACKGROUND {
                row_sum += 1;
            }
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    let filtered = GrayImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(w - 1) + 1;
        let y1 = (y + radius).min(h - 1) + 1;

        let fg = integral[y1 * stride + x1] + integral[y0 * stride + x0]
            - integral[y0 * stride + x1]
            - integral[y1 * stride + x0];
        let n = ((x1 - x0) * (y1 - y0)) as u32;
        let bg = n - fg;

        if bg <= n / 2 {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    });

    Ok(filtered)
}
