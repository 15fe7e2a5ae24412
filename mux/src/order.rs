//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Line assignment order for incoming connections

use crate::error::{MuxError, Result};
use std::fmt::Write;

/// Order in which free lines are offered to new connections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionOrder {
    /// Lines `0..N` in ascending order
    #[default]
    Sequential,
    /// A permutation of every line index
    Explicit(Vec<usize>),
}

impl ConnectionOrder {
    /// Parse a range list such as `1;5;2-4;7` for a multiplexer of `lines`.
    ///
    /// Lines are taken in first-seen order with duplicates ignored, and every
    /// line not mentioned follows in ascending order. A single term covering
    /// every line (`ALL` or `0-<N-1>`) selects [`ConnectionOrder::Sequential`].
    pub fn parse(spec: &str, lines: usize) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(MuxError::MissingValue("LINEORDER"));
        }
        if lines == 0 {
            return Err(MuxError::validation("multiplexer has no lines"));
        }
        let max = lines - 1;
        let mut seen = vec![false; lines];
        let mut order = Vec::with_capacity(lines);

        for term in spec.split(';').filter(|term| !term.trim().is_empty()) {
            let (low, high) = parse_range(term.trim(), max)?;
            if low > max || high > max {
                return Err(MuxError::LineOutOfRange {
                    line: low.max(high),
                    lines,
                });
            }
            if low == 0 && high == max {
                return Ok(ConnectionOrder::Sequential);
            }
            for line in low..=high {
                if !seen[line] {
                    seen[line] = true;
                    order.push(line);
                }
            }
        }

        order.extend((0..lines).filter(|&line| !seen[line]));
        Ok(ConnectionOrder::Explicit(order))
    }

    /// Returns `true` for the sequential sentinel
    pub fn is_sequential(&self) -> bool {
        matches!(self, ConnectionOrder::Sequential)
    }

    /// Line indices in assignment order for a multiplexer of `lines`.
    ///
    /// Entries of an explicit order outside `0..lines` fall back to the
    /// sequential index for that position.
    pub fn iter(&self, lines: usize) -> impl Iterator<Item = usize> + '_ {
        (0..lines).map(move |position| match self {
            ConnectionOrder::Sequential => position,
            ConnectionOrder::Explicit(order) => order
                .get(position)
                .copied()
                .filter(|&line| line < lines)
                .unwrap_or(position),
        })
    }

    /// Range-compressed listing, e.g. `1;5;2-4;7;0;6` or `0-7`.
    pub fn describe(&self, lines: usize) -> String {
        match self {
            ConnectionOrder::Sequential => format!("0-{}", lines.saturating_sub(1)),
            ConnectionOrder::Explicit(order) => {
                let mut text = String::new();
                let mut index = 0;
                while index < order.len() {
                    let low = order[index];
                    let mut high = low;
                    while index + 1 < order.len() && order[index + 1] == high + 1 {
                        index += 1;
                        high += 1;
                    }
                    if !text.is_empty() {
                        text.push(';');
                    }
                    if low == high {
                        let _ = write!(text, "{low}");
                    } else {
                        let _ = write!(text, "{low}-{high}");
                    }
                    index += 1;
                }
                text
            }
        }
    }
}

fn parse_range(term: &str, max: usize) -> Result<(usize, usize)> {
    if term.eq_ignore_ascii_case("ALL") {
        return Ok((0, max));
    }
    let parse = |text: &str| {
        text.trim()
            .parse::<usize>()
            .map_err(|_| MuxError::validation(format!("invalid line number '{}'", text.trim())))
    };
    match term.split_once('-') {
        Some((low, high)) => {
            let (low, high) = (parse(low)?, parse(high)?);
            if low > high {
                return Err(MuxError::validation(format!(
                    "invalid line range '{term}'"
                )));
            }
            Ok((low, high))
        }
        None => {
            let line = parse(term)?;
            Ok((line, line))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_order_fills_remaining_lines() {
        let order = ConnectionOrder::parse("1;5;2-4;7", 8).unwrap();
        assert_eq!(order, ConnectionOrder::Explicit(vec![1, 5, 2, 3, 4, 7, 0, 6]));
        assert_eq!(order.iter(8).collect::<Vec<_>>(), vec![1, 5, 2, 3, 4, 7, 0, 6]);
    }

    #[test]
    fn duplicates_keep_first_position() {
        let order = ConnectionOrder::parse("3;1-3;3", 4).unwrap();
        assert_eq!(order, ConnectionOrder::Explicit(vec![3, 1, 2, 0]));
    }

    #[test]
    fn full_range_is_sequential() {
        assert!(ConnectionOrder::parse("0-7", 8).unwrap().is_sequential());
        assert!(ConnectionOrder::parse("all", 8).unwrap().is_sequential());
        assert!(ConnectionOrder::parse("2;0-7", 8).unwrap().is_sequential());
    }

    #[test]
    fn listing_every_line_separately_stays_explicit() {
        let order = ConnectionOrder::parse("0;1;2", 3).unwrap();
        assert_eq!(order, ConnectionOrder::Explicit(vec![0, 1, 2]));
    }

    #[test]
    fn out_of_range_is_rejected() {
        let err = ConnectionOrder::parse("1;9", 8).unwrap_err();
        assert!(matches!(err, MuxError::LineOutOfRange { line: 9, lines: 8 }));
        assert!(ConnectionOrder::parse("6-9", 8).is_err());
    }

    #[test]
    fn malformed_terms_are_rejected() {
        assert!(ConnectionOrder::parse("x", 8).is_err());
        assert!(ConnectionOrder::parse("4-2", 8).is_err());
        assert!(matches!(
            ConnectionOrder::parse("", 8),
            Err(MuxError::MissingValue(_))
        ));
    }

    #[test]
    fn describe_compresses_ranges() {
        let order = ConnectionOrder::parse("1;5;2-4;7", 8).unwrap();
        assert_eq!(order.describe(8), "1;5;2-4;7;0;6");
        assert_eq!(ConnectionOrder::Sequential.describe(8), "0-7");
        let order = ConnectionOrder::parse("4-5", 6).unwrap();
        assert_eq!(order.describe(6), "4-5;0-3");
    }

    #[test]
    fn stale_entries_fall_back_to_position() {
        let order = ConnectionOrder::Explicit(vec![7, 0]);
        assert_eq!(order.iter(3).collect::<Vec<_>>(), vec![0, 0, 2]);
    }
}
