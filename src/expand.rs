//! Variant expansion module
//!
//! Turns one given name into password candidates: three case forms, each
//! followed by an optional zero-padded number and an optional special
//! character.

/// Special characters appended by default
pub const DEFAULT_SPECIAL_CHARACTERS: &str = "!$@_";

/// Default maximum width of the numeric suffix
pub const DEFAULT_MAX_DIGIT_WIDTH: u32 = 4;

/// Largest accepted digit width. Width 9 already means a billion suffixes.
pub const MAX_DIGIT_WIDTH_LIMIT: u32 = 9;

/// Case form applied to a name before suffixes are appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseForm {
    Lower,
    Upper,
    Title,
}

impl CaseForm {
    /// Emission order of the case forms
    pub const ALL: [CaseForm; 3] = [CaseForm::Lower, CaseForm::Upper, CaseForm::Title];

    pub fn apply(self, name: &str) -> String {
        match self {
            CaseForm::Lower => name.to_lowercase(),
            CaseForm::Upper => name.to_uppercase(),
            CaseForm::Title => title_case(name),
        }
    }
}

/// Uppercase the first letter of every whitespace-separated word and
/// lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;

    for c in text.chars() {
        if c.is_whitespace() {
            out.push(c);
            word_start = true;
        } else if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}

/// Precomputed suffix tables shared by every name of a run.
#[derive(Debug, Clone)]
pub struct VariantExpander {
    digit_suffixes: Vec<String>,
    special_suffixes: Vec<String>,
}

impl VariantExpander {
    /// Build the suffix tables.
    ///
    /// Numeric suffixes are `""` followed by every number of every width
    /// from 1 to `max_digit_width`, zero-padded to that width: `0..9`,
    /// `00..99`, and so on. The width is not checked here.
    pub fn new(max_digit_width: u32, special_characters: &str) -> Self {
        let mut digit_suffixes = vec![String::new()];
        let mut upper = 1u64;

        for width in 1..=max_digit_width as usize {
            upper *= 10;
            digit_suffixes.reserve(upper as usize);
            digit_suffixes.extend((0..upper).map(|n| format!("{:0width$}", n, width = width)));
        }

        let special_suffixes = std::iter::once(String::new())
            .chain(special_characters.chars().map(String::from))
            .collect();

        Self {
            digit_suffixes,
            special_suffixes,
        }
    }

    pub fn digit_suffixes(&self) -> &[String] {
        &self.digit_suffixes
    }

    pub fn special_suffixes(&self) -> &[String] {
        &self.special_suffixes
    }

    /// Number of variants produced for every name
    pub fn variants_per_name(&self) -> u64 {
        (CaseForm::ALL.len() * self.digit_suffixes.len() * self.special_suffixes.len()) as u64
    }

    /// All variants of `name`: case form outermost, then number, then
    /// special character.
    pub fn expand(&self, name: &str) -> Variants<'_> {
        Variants {
            forms: CaseForm::ALL.map(|form| form.apply(name)),
            digits: &self.digit_suffixes,
            specials: &self.special_suffixes,
            index: 0,
            total: self.variants_per_name() as usize,
        }
    }

    /// Feed every variant of `name` to `f` in `expand` order, reusing one
    /// buffer. Stops at the first error.
    pub fn try_for_each_variant<E, F>(&self, name: &str, mut f: F) -> Result<(), E>
    where
        F: FnMut(&str) -> Result<(), E>,
    {
        let mut buf = String::new();

        for form in CaseForm::ALL.map(|form| form.apply(name)) {
            for digits in &self.digit_suffixes {
                for special in &self.special_suffixes {
                    buf.clear();
                    buf.push_str(&form);
                    buf.push_str(digits);
                    buf.push_str(special);
                    f(&buf)?;
                }
            }
        }

        Ok(())
    }
}

impl Default for VariantExpander {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIGIT_WIDTH, DEFAULT_SPECIAL_CHARACTERS)
    }
}

/// Iterator returned by [`VariantExpander::expand`]
pub struct Variants<'a> {
    forms: [String; 3],
    digits: &'a [String],
    specials: &'a [String],
    index: usize,
    total: usize,
}

impl Iterator for Variants<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.total {
            return None;
        }

        let per_form = self.digits.len() * self.specials.len();
        let form = &self.forms[self.index / per_form];
        let rest = self.index % per_form;
        let digits = &self.digits[rest / self.specials.len()];
        let special = &self.specials[rest % self.specials.len()];
        self.index += 1;

        let mut variant = String::with_capacity(form.len() + digits.len() + special.len());
        variant.push_str(form);
        variant.push_str(digits);
        variant.push_str(special);
        Some(variant)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Variants<'_> {}
