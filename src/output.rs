//! Output formatting for decoded bitstreams.

use colored::Colorize;

/// Output formatter configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Emit grouped bits instead of hex bytes
    pub raw: bool,
    pub use_color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw: false,
            use_color: false,
        }
    }
}

/// Group a window's token string into a human-scannable line.
///
/// Start/stop markers get their own space-delimited slot. Data bits count up
/// since the last marker or byte boundary; every 9th bit is the slave's
/// acknowledge and collapses to ` A ` (bit low) or ` N ` (bit high). Runs cut
/// short by a marker or the end of the window stay as raw bits.
pub fn group_bits(tokens: &str) -> String {
    let mut out = String::new();
    let mut count = 0;
    for c in tokens.chars() {
        match c {
            '[' | ']' => {
                count = 0;
                out.truncate(out.trim_end().len());
                out.push(' ');
                out.push(c);
                out.push(' ');
            }
            '0' | '1' => {
                count += 1;
                if count == 9 {
                    out.push_str(if c == '0' { " A " } else { " N " });
                    count = 0;
                } else {
                    out.push(c);
                }
            }
            _ => {}
        }
    }
    out
}

/// Rewrite every complete 8-bit field of a grouped line as `0xHH`.
///
/// Only fields that are exactly eight `0`/`1` characters qualify; markers,
/// ack letters, and partial bit runs pass through untouched, so running this
/// over its own output is a no-op.
pub fn hexify(grouped: &str) -> String {
    grouped
        .split(' ')
        .map(|field| {
            if field.len() == 8 && field.bytes().all(|b| b == b'0' || b == b'1') {
                // Eight binary digits always fit a u8.
                let byte = u8::from_str_radix(field, 2).unwrap_or(0);
                format!("0x{byte:02X}")
            } else {
                field.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one window's line according to the configuration.
pub fn format_window(tokens: &str, config: &OutputConfig) -> String {
    let grouped = group_bits(tokens);
    let line = if config.raw { grouped } else { hexify(&grouped) };
    let line = line.trim();
    if config.use_color {
        colorize_line(line)
    } else {
        line.to_string()
    }
}

/// Terminal coloring pass. Only the rendering changes; the text of every
/// field is preserved so raw and hex output stay byte-comparable when
/// color is off.
fn colorize_line(line: &str) -> String {
    line.split(' ')
        .map(|field| match field {
            "[" | "]" => format!("{}", field.cyan()),
            "N" => format!("{}", field.red().bold()),
            "A" => format!("{}", field.green()),
            _ => field.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
