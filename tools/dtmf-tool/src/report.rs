use console::style;

use dtmf_au::detector::dtmf::Detection;
use dtmf_au::keypad::FREQUENCIES;

/// Printed in place of a symbol for blocks with no detection.
pub(crate) const NO_DETECTION: char = '.';

/// `offset symbol strongest second`, e.g. `     320 1 25830912.00 24904172.00`.
pub(crate) fn detection_line(offset: usize, detection: &Detection) -> String {
    let symbol = match detection.symbol {
        Some(symbol) => style(symbol).green().bold(),
        None         => style(NO_DETECTION).dim(),
    };
    format!("{offset:8} {symbol} {:.2} {:.2}", detection.strongest, detection.second)
}

pub(crate) fn magnitudes_header() -> String {
    let mut line = String::from("offset");
    for frequency in FREQUENCIES {
        line.push_str(&format!(" {frequency}Hz"));
    }
    line
}

/// Space-separated, rows then columns, for plotting.
pub(crate) fn magnitudes_line(offset: usize, values: &[f32]) -> String {
    let mut line = offset.to_string();
    for value in values {
        line.push_str(&format!(" {value:.2}"));
    }
    line
}

///////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use dtmf_au::detector::dtmf::Magnitudes;

    use super::*;

    fn detection(symbol: Option<char>) -> Detection {
        Detection {
            symbol,
            strongest: 1234.5,
            second: 99.0,
            magnitudes: Magnitudes([0.0; 8]),
        }
    }

    #[test]
    fn detection_lines() {
        console::set_colors_enabled(false);

        assert_eq!(detection_line(0, &detection(Some('5'))), "       0 5 1234.50 99.00");
        assert_eq!(detection_line(12345678, &detection(None)), "12345678 . 1234.50 99.00");
    }

    #[test]
    fn magnitude_lines() {
        assert_eq!(magnitudes_header(), "offset 697Hz 770Hz 852Hz 941Hz 1209Hz 1336Hz 1477Hz 1633Hz");
        assert_eq!(magnitudes_line(240, &[1.0, 0.5, f32::NEG_INFINITY]), "240 1.00 0.50 -inf");
    }
}
