//! The DTMF keypad: sixteen symbols, each the sum of one row tone and one
//! column tone.
//!
//! ```text
//!          1209  1336  1477  1633
//!    697    1     2     3     A
//!    770    4     5     6     B
//!    852    7     8     9     C
//!    941    *     0     #     D
//! ```

pub type FrequencyHz = u16;

pub static ROW_FREQUENCIES:    [FrequencyHz; 4] = [ 697,  770,  852,  941];
pub static COLUMN_FREQUENCIES: [FrequencyHz; 4] = [1209, 1336, 1477, 1633];

/// All eight tones, rows first. This is also the order in which the
/// detector reports per-frequency magnitudes.
pub static FREQUENCIES: [FrequencyHz; 8] = [
     697,  770,  852,  941,
    1209, 1336, 1477, 1633,
];

static KEY_MAP: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// One row tone and one column tone.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FrequencyPair {
    pub row: FrequencyHz,
    pub column: FrequencyHz,
}

impl FrequencyPair {
    /// Builds a pair from two tones in either order. Returns `None` unless
    /// exactly one is a row tone and the other a column tone.
    pub fn from_unordered(a: FrequencyHz, b: FrequencyHz) -> Option<Self> {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        if is_row(low) && is_column(high) {
            Some(Self { row: low, column: high })
        } else {
            None
        }
    }

    pub fn symbol(&self) -> Option<char> {
        let row = row_index(self.row)?;
        let column = column_index(self.column)?;
        Some(KEY_MAP[row][column])
    }
}

pub fn is_row(frequency: FrequencyHz) -> bool {
    ROW_FREQUENCIES.contains(&frequency)
}

pub fn is_column(frequency: FrequencyHz) -> bool {
    COLUMN_FREQUENCIES.contains(&frequency)
}

fn row_index(frequency: FrequencyHz) -> Option<usize> {
    ROW_FREQUENCIES.iter().position(|&f| f == frequency)
}

fn column_index(frequency: FrequencyHz) -> Option<usize> {
    COLUMN_FREQUENCIES.iter().position(|&f| f == frequency)
}

/// Maps the command-line friendly spellings onto keypad symbols: `S` for
/// star and `H` for hash. Anything else passes through untouched.
pub fn canonical_symbol(symbol: char) -> char {
    match symbol {
        'S' => '*',
        'H' => '#',
        other => other,
    }
}

/// Frequencies for a keypad symbol, aliases included.
pub fn pair_for_symbol(symbol: char) -> Option<FrequencyPair> {
    let symbol = canonical_symbol(symbol);

    for (row, keys) in KEY_MAP.iter().enumerate() {
        if let Some(column) = keys.iter().position(|&k| k == symbol) {
            return Some(FrequencyPair {
                row: ROW_FREQUENCIES[row],
                column: COLUMN_FREQUENCIES[column],
            });
        }
    }
    None
}

pub fn symbol_for_pair(a: FrequencyHz, b: FrequencyHz) -> Option<char> {
    FrequencyPair::from_unordered(a, b)?.symbol()
}

/// Every keypad symbol in row-major order.
pub fn symbols() -> impl Iterator<Item = char> {
    KEY_MAP.iter().flat_map(|keys| keys.iter().copied())
}

///////////////////////////////////////////////////////////////////////
