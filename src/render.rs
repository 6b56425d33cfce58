//! Template substitution.

use std::collections::HashMap;

use crate::{
    template::{Segment, Template},
    types::TranslationMap,
};

/// Substitutes every placeholder of `template` with its text in `map`.
///
/// Substitution is safe: a placeholder without a value is written back in its
/// template syntax instead of failing. Parts of a multi-line text receive a
/// slice of the value chosen by [`distribute`].
pub fn render(template: &Template, map: &TranslationMap) -> String {
    let mut out = String::new();
    let mut pieces: HashMap<&str, Vec<String>> = HashMap::new();

    for (position, segment) in template.segments().iter().enumerate() {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(placeholder) => {
                let Some(value) = map.get(&placeholder.name) else {
                    out.push_str(&placeholder.to_string());
                    continue;
                };
                match placeholder.part {
                    None => out.push_str(value),
                    Some(part) => {
                        let name = placeholder.name.as_str();
                        if part.index == 0 || !pieces.contains_key(name) {
                            let split = distribute(value, &template.occurrence_widths(position))
                                .into_iter()
                                .map(str::to_string)
                                .collect();
                            pieces.insert(name, split);
                        }
                        if let Some(piece) = pieces.get(name).and_then(|parts| parts.get(part.index)) {
                            out.push_str(piece);
                        }
                    }
                }
            }
        }
    }
    out
}

/// Splits `value` into one slice per source width.
///
/// When the value has exactly the source length, the source widths are used
/// as they are, so an untouched text renders back byte for byte. Otherwise each
/// part gets a share proportional to its source width. In both cases a cut
/// never leaves a slice ending in an unpaired backslash, so escape sequences
/// stay within one string literal. The last part takes whatever remains.
pub fn distribute<'v>(value: &'v str, widths: &[usize]) -> Vec<&'v str> {
    if widths.is_empty() {
        return vec![value];
    }
    let chars: Vec<(usize, char)> = value.char_indices().collect();
    let len = chars.len();
    let total: usize = widths.iter().sum();
    let byte_at = |position: usize| chars.get(position).map_or(value.len(), |(byte, _)| *byte);

    let mut slices = Vec::with_capacity(widths.len());
    let mut previous = 0;
    let mut cumulative = 0;
    for width in &widths[..widths.len() - 1] {
        cumulative += width;
        let mut cut = if total == len {
            cumulative
        } else if total == 0 {
            len
        } else {
            cumulative * len / total
        };
        cut = cut.clamp(previous, len);
        while cut > previous && cut < len && splits_escape(&chars, cut) {
            cut += 1;
        }
        slices.push(&value[byte_at(previous)..byte_at(cut)]);
        previous = cut;
    }
    slices.push(&value[byte_at(previous)..]);
    slices
}

/// Whether cutting before `cut` separates a backslash from the character it
/// escapes, i.e. the backslash run ending at `cut` has odd length.
fn splits_escape(chars: &[(usize, char)], cut: usize) -> bool {
    chars[..cut]
        .iter()
        .rev()
        .take_while(|(_, c)| *c == '\\')
        .count()
        % 2
        == 1
}
