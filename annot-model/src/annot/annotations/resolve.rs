//! Position lookup: from record coordinates to token indices

use std::collections::BTreeMap;

use crate::annot::error::ResolutionProblem;
use crate::annot::tokens::Token;

/// Per-field index over a token sequence
///
/// Within a field tokens are ordered by offset, so lookups are binary searches over
/// the field's token indices.
pub struct TokenLookup<'a> {
    tokens: &'a [Token],
    by_field: BTreeMap<&'a str, Vec<usize>>,
}

impl<'a> TokenLookup<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let mut by_field: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, token) in tokens.iter().enumerate() {
            by_field.entry(token.field.as_str()).or_default().push(i);
        }
        Self { tokens, by_field }
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    /// Tokens of `field` intersecting `[offset, offset + length)`
    ///
    /// A token occupies its text and trailing whitespace. A zero length is treated as
    /// one char so that a bare offset still finds its token.
    pub fn resolve_range(
        &self,
        field: &str,
        offset: usize,
        length: usize,
    ) -> Result<(usize, usize), ResolutionProblem> {
        let ids = self
            .by_field
            .get(field)
            .ok_or_else(|| ResolutionProblem::UnknownField {
                field: field.to_string(),
            })?;
        let limit = offset + length.max(1);

        let first = ids.partition_point(|&i| {
            let t = &self.tokens[i];
            t.end_with_post().max(t.offset + 1) <= offset
        });
        let past_last = ids.partition_point(|&i| self.tokens[i].offset < limit);

        if first >= past_last {
            return Err(ResolutionProblem::UnknownPosition {
                field: field.to_string(),
                offset,
            });
        }
        Ok((ids[first], ids[past_last - 1]))
    }

    /// The token covering `offset` in `field`
    pub fn resolve_offset(&self, field: &str, offset: usize) -> Result<usize, ResolutionProblem> {
        let (start, _) = self.resolve_range(field, offset, 1)?;
        if self.tokens[start].covers(offset) {
            Ok(start)
        } else {
            Err(ResolutionProblem::UnknownPosition {
                field: field.to_string(),
                offset,
            })
        }
    }

    /// Tokens from `index` on, extended within its field while they start before
    /// `tokens[index].offset + length`
    pub fn resolve_index(
        &self,
        index: usize,
        length: Option<usize>,
    ) -> Result<(usize, usize), ResolutionProblem> {
        let first = self
            .tokens
            .get(index)
            .ok_or(ResolutionProblem::IndexOutOfRange { index })?;
        let Some(length) = length else {
            return Ok((index, index));
        };
        let limit = first.offset + length.max(1);
        let mut end = index;
        while let Some(next) = self.tokens.get(end + 1) {
            if next.field != first.field || next.offset >= limit {
                break;
            }
            end += 1;
        }
        Ok((index, end))
    }

    /// Resolve record coordinates, preferring a direct index
    pub fn resolve(
        &self,
        field: Option<&str>,
        offset: Option<usize>,
        length: Option<usize>,
        index: Option<usize>,
    ) -> Result<(usize, usize), ResolutionProblem> {
        match (index, field, offset) {
            (Some(index), _, _) => self.resolve_index(index, length),
            (None, Some(field), Some(offset)) => {
                self.resolve_range(field, offset, length.unwrap_or(0))
            }
            (None, None, _) | (None, _, None) => Err(ResolutionProblem::MissingField),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annot::testing::factories::{append_field, mk_tokens};

    fn sample() -> Vec<Token> {
        let mut tokens = mk_tokens("title", &[("Title", "")]);
        append_field(&mut tokens, "text", &[("Hello", " "), ("world", ""), (".", "")]);
        tokens
    }

    #[test]
    fn test_range_within_field() {
        let tokens = sample();
        let lookup = TokenLookup::new(&tokens);
        assert_eq!(lookup.resolve_range("text", 0, 5), Ok((1, 1)));
        assert_eq!(lookup.resolve_range("text", 0, 11), Ok((1, 2)));
        assert_eq!(lookup.resolve_range("text", 6, 6), Ok((2, 3)));
        assert_eq!(lookup.resolve_range("title", 0, 5), Ok((0, 0)));
    }

    #[test]
    fn test_offset_in_trailing_whitespace() {
        let tokens = sample();
        let lookup = TokenLookup::new(&tokens);
        assert_eq!(lookup.resolve_offset("text", 5), Ok(1));
        assert_eq!(lookup.resolve_offset("text", 6), Ok(2));
    }

    #[test]
    fn test_unresolvable_positions() {
        let tokens = sample();
        let lookup = TokenLookup::new(&tokens);
        assert!(matches!(
            lookup.resolve_range("text", 40, 2),
            Err(ResolutionProblem::UnknownPosition { offset: 40, .. })
        ));
        assert!(matches!(
            lookup.resolve_range("body", 0, 2),
            Err(ResolutionProblem::UnknownField { .. })
        ));
        assert_eq!(
            lookup.resolve_index(9, None),
            Err(ResolutionProblem::IndexOutOfRange { index: 9 })
        );
        assert_eq!(lookup.resolve(None, Some(0), Some(1), None), Err(ResolutionProblem::MissingField));
    }

    #[test]
    fn test_index_with_length_stays_in_field() {
        let tokens = sample();
        let lookup = TokenLookup::new(&tokens);
        assert_eq!(lookup.resolve_index(1, Some(12)), Ok((1, 3)));
        assert_eq!(lookup.resolve_index(0, Some(100)), Ok((0, 0)));
        assert_eq!(lookup.resolve_index(2, None), Ok((2, 2)));
    }
}
