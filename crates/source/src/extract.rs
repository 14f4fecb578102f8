//! Summary extraction from AO3 work pages.

use crate::consts;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use fictrack_metadata::{Chapters, WorkSummary};
use scraper::{Html, Selector};
use time::{Date, Month, PrimitiveDateTime};
use tracing::instrument;

/// Parses the metadata block of an AO3 work page.
///
/// Accepts raw bytes, instead of requiring HTML to be valid UTF-8. Invalid byte
/// sequences are replaced with U+FFFD during parsing.
#[instrument(skip(html), fields(html_size = html.as_ref().len()))]
pub fn extract_summary(work_id: u64, html: impl AsRef<[u8]>) -> Result<WorkSummary> {
    Extractor::from_html(&String::from_utf8_lossy(html.as_ref())).summary(work_id)
}

#[derive(Debug)]
pub struct Extractor {
    document: Html,
}
impl Extractor {
    pub fn from_html(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// The stats block only renders for a readable work, so its presence is
    /// the validity check.
    pub fn is_valid(&self) -> bool {
        self.document.select(&consts::STATS_SELECTOR).next().is_some()
    }

    /// Extracts a [`WorkSummary`].
    ///
    /// The work ID is not reliably present in the page body, so the caller
    /// passes along the ID it requested.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTML is not an AO3 work page
    /// - Required fields cannot be found or parsed
    pub fn summary(&self, work_id: u64) -> Result<WorkSummary> {
        if !self.is_valid() {
            exn::bail!(ErrorKind::InvalidDocument);
        }
        Ok(WorkSummary {
            work_id,
            title: self.title()?,
            authors: self.authors(),
            chapters: self.chapters()?,
            words: self.words()?,
            updated_at: self.updated_at()?,
        })
    }

    fn text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .next()
            .map(|element| element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|text| !text.is_empty())
    }

    fn title(&self) -> Result<String> {
        self.text(&consts::TITLE_SELECTOR).ok_or_raise(|| ErrorKind::MissingField("title"))
    }

    fn authors(&self) -> Vec<String> {
        self.document
            .select(&consts::BYLINE_SELECTOR)
            .map(|anchor| anchor.text().collect::<String>().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }

    #[instrument(level = "trace", skip(self))]
    fn chapters(&self) -> Result<Chapters> {
        let text = self.text(&consts::CHAPTERS_SELECTOR).ok_or_raise(|| ErrorKind::MissingField("chapters"))?;
        let captures = consts::CHAPTERS_REGEX.captures(&text).ok_or_raise(|| ErrorKind::ParseError {
            field: "chapters",
            value: text.clone(),
        })?;
        let written = parse_number(&captures[1], "chapters")?;
        let total = match &captures[2] {
            "?" => None,
            total => Some(parse_number(total, "chapters")?),
        };
        Ok(Chapters::new(written, total))
    }

    #[instrument(level = "trace", skip(self))]
    fn words(&self) -> Result<u64> {
        let text = self.text(&consts::WORDS_SELECTOR).ok_or_raise(|| ErrorKind::MissingField("words"))?;
        let captures = consts::WORDS_REGEX.captures(&text).ok_or_raise(|| ErrorKind::ParseError {
            field: "words",
            value: text.clone(),
        })?;
        parse_number(&captures[1], "words")
    }

    /// Last "Updated"/"Completed" date, falling back to the publication date
    /// for works that were never updated.
    #[instrument(level = "trace", skip(self))]
    fn updated_at(&self) -> Result<PrimitiveDateTime> {
        let date = match self.text(&consts::STATUS_SELECTOR) {
            Some(status) => parse_date(&status, "updated")?,
            None => {
                let published =
                    self.text(&consts::PUBLISHED_SELECTOR).ok_or_raise(|| ErrorKind::MissingField("published"))?;
                parse_date(&published, "published")?
            },
        };
        Ok(date.midnight())
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &'static str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.replace(',', "").parse::<T>().or_raise(|| ErrorKind::ParseError {
        field,
        value: value.to_string(),
    })
}

fn parse_date(value: &str, field: &'static str) -> Result<Date> {
    let invalid = || ErrorKind::ParseError {
        field,
        value: value.to_string(),
    };
    let captures = consts::DATE_REGEX.captures(value).ok_or_raise(invalid)?;
    let year = captures[1].parse::<i32>().or_raise(invalid)?;
    let month = captures[2].parse::<u8>().or_raise(invalid)?;
    let day = captures[3].parse::<u8>().or_raise(invalid)?;
    let month = Month::try_from(month).or_raise(invalid)?;
    Date::from_calendar_date(year, month, day).or_raise(invalid)
}
