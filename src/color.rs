#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpacks `0xRRGGBB`.
    pub const fn from_hex(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }

    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn from_f32(rgb: [f32; 3]) -> Self {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(q(rgb[0]), q(rgb[1]), q(rgb[2]))
    }
}

pub const PALETTE: [Rgb; 8] = [
    Rgb::from_hex(0xFF1E1E), // red
    Rgb::from_hex(0xFF9C1E), // orange
    Rgb::from_hex(0xFFEC1E), // yellow
    Rgb::from_hex(0x37FF1E), // green
    Rgb::from_hex(0x1EFFEC), // cyan
    Rgb::from_hex(0x1E7BFF), // blue
    Rgb::from_hex(0x9C1EFF), // violet
    Rgb::from_hex(0xFF1E9C), // pink
];

pub fn random_palette_color(rng: &mut fastrand::Rng) -> Rgb {
    PALETTE[rng.usize(0..PALETTE.len())]
}
