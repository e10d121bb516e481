pub mod healing;
pub mod processor; // heal → classify → normalize → band
pub mod sentiment;
