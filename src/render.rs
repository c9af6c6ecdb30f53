use std::fs;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::assignment::Assignment;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::structure::Crossword;

/// Character drawn for cells that aren't part of the puzzle.
pub const BLOCK: char = '█';

/// Side of one grid cell in the exported image, in pixels.
pub const CELL_SIZE: u32 = 100;

/// Black margin kept on each side of an open cell.
pub const CELL_BORDER: u32 = 2;

const LETTER_SCALE: f32 = 80.0;

// Letters sit slightly above the cell's vertical center.
const LETTER_LIFT: i32 = 10;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// The letter in each cell, `None` for blocks and unfilled cells.
fn letter_grid(
    crossword: &Crossword,
    dictionary: &Dictionary,
    assignment: &Assignment,
) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; crossword.width()]; crossword.height()];

    for choice in assignment.iter() {
        let slot = crossword.slot(choice.slot_id);
        let word = dictionary.word(choice.word_id);

        for ((row, col), &glyph) in slot.cells().into_iter().zip(&word.glyphs) {
            letters[row][col] = Some(dictionary.glyph(glyph));
        }
    }

    letters
}

/// Turn the given crossword and assignment into a rendered string, one line per row. Open cells
/// without a letter are left blank.
pub fn render_grid(
    crossword: &Crossword,
    dictionary: &Dictionary,
    assignment: &Assignment,
) -> String {
    let letters = letter_grid(crossword, dictionary, assignment);

    letters
        .iter()
        .enumerate()
        .map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(|(col, letter)| match letter {
                    _ if !crossword.is_open(row, col) => BLOCK,
                    Some(letter) => *letter,
                    None => ' ',
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read a TrueType or OpenType font for `render_image`.
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontVec> {
    let bytes = fs::read(path)?;
    Ok(FontVec::try_from_vec(bytes)?)
}

/// Draw the grid as an image: `CELL_SIZE` pixels per cell on a black canvas, open cells white
/// inside a `CELL_BORDER` margin, assigned letters centered in their cell. Without a font only
/// the grid itself is drawn.
pub fn render_image(
    crossword: &Crossword,
    dictionary: &Dictionary,
    assignment: &Assignment,
    font: Option<&FontVec>,
) -> RgbaImage {
    let letters = letter_grid(crossword, dictionary, assignment);
    let interior_size = CELL_SIZE - 2 * CELL_BORDER;
    let scale = PxScale::from(LETTER_SCALE);

    let mut image = RgbaImage::from_pixel(
        crossword.width() as u32 * CELL_SIZE,
        crossword.height() as u32 * CELL_SIZE,
        BLACK,
    );

    for row in 0..crossword.height() {
        for col in 0..crossword.width() {
            if !crossword.is_open(row, col) {
                continue;
            }

            let x = (col as u32 * CELL_SIZE + CELL_BORDER) as i32;
            let y = (row as u32 * CELL_SIZE + CELL_BORDER) as i32;
            let cell = Rect::at(x, y).of_size(interior_size, interior_size);
            draw_filled_rect_mut(&mut image, cell, WHITE);

            if let (Some(font), Some(letter)) = (font, letters[row][col]) {
                let text = letter.to_string();
                let (text_width, text_height) = text_size(scale, font, &text);
                let text_x = x + (interior_size as i32 - text_width as i32) / 2;
                let text_y = y + (interior_size as i32 - text_height as i32) / 2 - LETTER_LIFT;
                draw_text_mut(&mut image, BLACK, text_x, text_y, scale, font, &text);
            }
        }
    }

    image
}

/// Render the grid with `render_image` and write it to `path`. The format follows the file
/// extension.
pub fn save_image<P: AsRef<Path>>(
    crossword: &Crossword,
    dictionary: &Dictionary,
    assignment: &Assignment,
    font: Option<&FontVec>,
    path: P,
) -> Result<()> {
    render_image(crossword, dictionary, assignment, font).save(path)?;
    Ok(())
}
