//! Quarter label arithmetic for forecast periods.
//!
//! Historical labels are free-form strings. When the last one looks like a
//! quarter label we continue the sequence; otherwise forecast periods are
//! labelled relative to it (`"<last>+1"`, `"<last>+2"`, ...).
//!
//! Recognised shapes: `2024Q3`, `2024-Q3`, `2024 Q3`, `Q3 2024`, `Q3-2024`
//! (case-insensitive `q`).

/// A calendar quarter plus the layout its label was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Quarter {
    year: i32,
    quarter: u8,
    layout: Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `2024Q3` / `2024-Q3` / `2024 Q3`; the separator is kept.
    YearFirst(Option<char>),
    /// `Q3 2024` / `Q3-2024`.
    QuarterFirst(char),
}

impl Quarter {
    fn advance(self, steps: usize) -> Self {
        let index = self.year as i64 * 4 + (self.quarter as i64 - 1) + steps as i64;
        Self {
            year: index.div_euclid(4) as i32,
            quarter: (index.rem_euclid(4) + 1) as u8,
            layout: self.layout,
        }
    }

    fn label(&self) -> String {
        match self.layout {
            Layout::YearFirst(None) => format!("{}Q{}", self.year, self.quarter),
            Layout::YearFirst(Some(sep)) => format!("{}{sep}Q{}", self.year, self.quarter),
            Layout::QuarterFirst(sep) => format!("Q{}{sep}{}", self.quarter, self.year),
        }
    }
}

fn parse_quarter(label: &str) -> Option<Quarter> {
    let s = label.trim().to_ascii_uppercase();

    if let Some(rest) = s.strip_prefix('Q') {
        // Q3 2024 / Q3-2024
        let mut chars = rest.chars();
        let q = chars.next()?.to_digit(10)? as u8;
        let sep = chars.next()?;
        if sep != ' ' && sep != '-' {
            return None;
        }
        let year: i32 = chars.as_str().parse().ok()?;
        return valid(year, q).then_some(Quarter {
            year,
            quarter: q,
            layout: Layout::QuarterFirst(sep),
        });
    }

    // 2024Q3 / 2024-Q3 / 2024 Q3
    let q_pos = s.find('Q')?;
    let (head, tail) = s.split_at(q_pos);
    let q: u8 = tail[1..].parse().ok()?;
    let (year_str, sep) = match head.chars().last()? {
        c @ (' ' | '-') => (&head[..head.len() - 1], Some(c)),
        _ => (head, None),
    };
    let year: i32 = year_str.parse().ok()?;
    valid(year, q).then_some(Quarter {
        year,
        quarter: q,
        layout: Layout::YearFirst(sep),
    })
}

fn valid(year: i32, quarter: u8) -> bool {
    (1..=4).contains(&quarter) && (0..=9999).contains(&year)
}

/// Labels for `horizon` periods following `last_label`.
pub fn forecast_labels(last_label: &str, horizon: usize) -> Vec<String> {
    match parse_quarter(last_label) {
        Some(q) => (1..=horizon).map(|h| q.advance(h).label()).collect(),
        None => (1..=horizon).map(|h| format!("{}+{h}", last_label.trim())).collect(),
    }
}
