//! Built-in weather icons
//!
//! 8x8 pixel art kept in flash. These names resolve without touching the
//! asset source and never take a cache slot.

use super::bitmap::BitmapView;
use crate::config::rgb565;

const SIZE: u16 = 8;

const fn shade(c: u8) -> u16 {
    match c {
        b'Y' => rgb565(255, 200, 0),
        b'O' => rgb565(255, 140, 0),
        b'M' => rgb565(230, 230, 180),
        b'W' => rgb565(220, 220, 220),
        b'G' => rgb565(140, 140, 150),
        b'D' => rgb565(80, 80, 90),
        b'B' => rgb565(60, 120, 255),
        b'L' => rgb565(255, 255, 60),
        _ => 0,
    }
}

/// Expand palette art into RGB565
const fn art(rows: [&[u8; 8]; 8]) -> [u16; 64] {
    let mut out = [0u16; 64];
    let mut y = 0;
    while y < 8 {
        let mut x = 0;
        while x < 8 {
            out[y * 8 + x] = shade(rows[y][x]);
            x += 1;
        }
        y += 1;
    }
    out
}

const CLEAR_DAY: [u16; 64] = art([
    b"Y..Y..Y.",
    b".Y.Y.Y..",
    b"..YYY...",
    b"YYYOYYY.",
    b"..YYY...",
    b".Y.Y.Y..",
    b"Y..Y..Y.",
    b"........",
]);

const CLEAR_NIGHT: [u16; 64] = art([
    b"..MMM...",
    b".MM.....",
    b"MM......",
    b"MM......",
    b"MM......",
    b".MM...M.",
    b"..MMMM..",
    b"........",
]);

const PARTLY_DAY: [u16; 64] = art([
    b"..Y.Y...",
    b"...YYY..",
    b"..YYYYY.",
    b"...WWW..",
    b".WWWWWW.",
    b"WWWWWWWW",
    b".WWWWWW.",
    b"........",
]);

const PARTLY_NIGHT: [u16; 64] = art([
    b"...MM...",
    b"..MM....",
    b"..MM..M.",
    b"...WWW..",
    b".WWWWWW.",
    b"WWWWWWWW",
    b".WWWWWW.",
    b"........",
]);

const CLOUDY: [u16; 64] = art([
    b"........",
    b"..GGG...",
    b".GWWWGG.",
    b"GWWWWWWG",
    b"GWWWWWWG",
    b".GGGGGG.",
    b"........",
    b"........",
]);

const RAIN: [u16; 64] = art([
    b"..GGG...",
    b".GGGGGG.",
    b"GGGGGGGG",
    b".GGGGGG.",
    b"........",
    b".B..B..B",
    b"B..B..B.",
    b"........",
]);

const HEAVY_RAIN: [u16; 64] = art([
    b"..DDD...",
    b".DDDDDD.",
    b"DDDDDDDD",
    b".DDDDDD.",
    b"B.B.B.B.",
    b".B.B.B.B",
    b"B.B.B.B.",
    b".B.B.B.B",
]);

const THUNDER: [u16; 64] = art([
    b"..DDD...",
    b".DDDDDD.",
    b"DDDDDDDD",
    b".DDLDDD.",
    b"...LL...",
    b"..LL....",
    b"...L....",
    b"..L.....",
]);

const SNOW: [u16; 64] = art([
    b"..GGG...",
    b".GGGGGG.",
    b"GGGGGGGG",
    b".GGGGGG.",
    b"........",
    b".W..W..W",
    b"...W..W.",
    b".W..W...",
]);

const FOG: [u16; 64] = art([
    b"........",
    b"GGGGGG..",
    b"........",
    b"..GGGGGG",
    b"........",
    b"GGGGGG..",
    b"........",
    b"..GGGGGG",
]);

static ICONS: [(&str, &[u16; 64]); 10] = [
    ("w_clear_day", &CLEAR_DAY),
    ("w_clear_night", &CLEAR_NIGHT),
    ("w_partly_day", &PARTLY_DAY),
    ("w_partly_night", &PARTLY_NIGHT),
    ("w_cloudy", &CLOUDY),
    ("w_rain", &RAIN),
    ("w_heavy_rain", &HEAVY_RAIN),
    ("w_thunder", &THUNDER),
    ("w_snow", &SNOW),
    ("w_fog", &FOG),
];

/// Look up a built-in icon
pub fn builtin(name: &str) -> Option<BitmapView<'static>> {
    ICONS
        .iter()
        .find(|(icon, _)| *icon == name)
        .map(|(_, pixels)| BitmapView {
            width: SIZE,
            height: SIZE,
            pixels: &pixels[..],
        })
}

pub fn is_builtin(name: &str) -> bool {
    ICONS.iter().any(|(icon, _)| *icon == name)
}
