use super::model::{ByteContent, Content, Statement};
use crate::hw::{self, Byte};
use std::fmt::Display;

const ROW_SHADED: &str = "#d0f0d0";
const ROW_PLAIN: &str = "#ffffff";

/// Background colours for the 2-3-3 bit groups of a byte, matching its octal digits.
const BIT_GROUPS: [(usize, &str); 3] = [(2, "#cca43b"), (3, "#0075f2"), (3, "#d81e5b")];

/// Render `val` in binary, split into the bit groups of its three octal digits.
pub fn binary_html(val: Byte) -> String {
    let bits = format!("{:08b}", val);

    let mut out = String::from(" (");
    let mut start = 0;
    for (width, colour) in BIT_GROUPS.iter() {
        out.push_str(&format!(
            "<font color=\"#ffffff\" style=\"background-color: {};\">&nbsp;{}&nbsp;</font>",
            colour,
            &bits[start..start + width]
        ));
        start += width;
    }
    out.push(')');
    out
}

/// Escape the characters that would otherwise be read as markup.
fn escape(text: &str) -> String {
    text.chars().fold(String::with_capacity(text.len()), |mut out, ch| {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
        out
    })
}

fn cell_lines(byte: &ByteContent) -> Vec<String> {
    match byte.content() {
        Content::Label(_) => vec![format!(
            "{}: {}",
            hw::format_octal(byte.location()),
            escape(&byte.to_string())
        )],
        Content::Operation(_) | Content::Jump(_) => byte
            .values()
            .into_iter()
            .enumerate()
            .map(|(offset, val)| {
                format!(
                    "{}: {}{}",
                    hw::format_octal(byte.location() + offset),
                    hw::format_octal(val.into()),
                    binary_html(val)
                )
            })
            .collect(),
    }
}

/// An HTML table listing each statement next to the addresses and values it occupies.
pub struct Listing<'a> {
    name: &'a str,
    stmts: &'a [Statement],
}

impl<'a> Listing<'a> {
    pub fn new(name: &'a str, stmts: &'a [Statement]) -> Self {
        Listing { name, stmts }
    }
}

impl Display for Listing<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "<html>")?;
        let name = escape(self.name);
        writeln!(f, "<head><title>{}</title></head>", name)?;
        writeln!(f, "<body>")?;
        writeln!(f, "<h1>Operation Codes for {}</h1>", name)?;
        writeln!(f, "  <table border=\"1\">")?;
        writeln!(
            f,
            "    <tr><th>Statement Number</th><th>Statement</th><th>Memory Location, Op Codes, and Values</th></tr>"
        )?;

        for (num, stmt) in self.stmts.iter().enumerate() {
            let bg = if num % 2 == 0 { ROW_SHADED } else { ROW_PLAIN };

            writeln!(f, "    <tr>")?;
            writeln!(f, "      <td bgcolor=\"{}\">{}</td>", bg, num + 1)?;
            writeln!(f, "      <td bgcolor=\"{}\">{}</td>", bg, escape(&stmt.formatted()))?;
            writeln!(f, "      <td bgcolor=\"{}\">", bg)?;
            writeln!(f, "        <table border=\"0\">")?;
            for line in stmt.bytes().iter().flat_map(cell_lines) {
                writeln!(f, "        <tr><td bgcolor=\"{}\">{}</td></tr>", bg, line)?;
            }
            writeln!(f, "        </table>")?;
            writeln!(f, "      </td>")?;
            writeln!(f, "    </tr>")?;
        }

        writeln!(f, "  </table>")?;
        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

pub fn html(name: &str, stmts: &[Statement]) -> String {
    Listing::new(name, stmts).to_string()
}
