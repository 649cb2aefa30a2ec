use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_ellipse_mut};

fn main() {
    // Orange on a pale counter, with some sensor noise
    let mut orange = RgbImage::from_pixel(800, 600, Rgb([235, 235, 230]));
    draw_filled_circle_mut(&mut orange, (400, 300), 150, Rgb([250, 130, 10]));
    for i in 0..400u32 {
        let x = (i * 7919) % 800;
        let y = (i * 104729) % 600;
        orange.put_pixel(x, y, Rgb([240, 120, 0]));
    }
    orange.save("test_orange.png").unwrap();
    println!("Created test_orange.png (800x600 orange on counter)");

    let mut banana = RgbImage::from_pixel(800, 600, Rgb([235, 235, 230]));
    draw_filled_ellipse_mut(&mut banana, (400, 300), 260, 70, Rgb([245, 215, 40]));
    banana.save("test_banana.png").unwrap();
    println!("Created test_banana.png (800x600 banana on counter)");
}
