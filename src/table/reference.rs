//! Spreadsheet-style cell reference arithmetic.
//!
//! Column letters follow the bijective base-26 scheme (A=1 .. Z=26, AA=27)
//! independent of any host quirks. Row numbers on the wire are 1-based.

/// Converts a 0-based column index to its letter form.
pub fn index_to_letters(column: usize) -> String {
    let mut column = column as u32 + 1;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        let digit = char::from_u32(65 + column % 26).expect("Hardcode letters");
        column /= 26;
        letters.insert(0, digit);
    }
    letters
}

/// Converts a column letter string to its 0-based index.
/// Returns None for empty input or non-letter characters.
pub fn letters_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut index: usize = 0;
    for character in letters.chars() {
        if !character.is_ascii_alphabetic() {
            return None;
        }
        index = index * 26 + (character.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(index - 1)
}

/// Spreadsheet-style cell position for 0-based coordinates, e.g. (2, 1) -> "B3".
pub fn cell_position(row: usize, column: usize) -> String {
    format!("{}{}", index_to_letters(column), row + 1)
}

/// Builds the totals formula for one column over an inclusive 0-based row
/// span: `=SUM(<Col><Start>:<Col><End>)` with 1-based row numbers.
pub fn sum_formula(column: usize, first_row: usize, last_row: usize) -> String {
    let letters = index_to_letters(column);
    format!("=SUM({}{}:{}{})", letters, first_row + 1, letters, last_row + 1)
}
