use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

const SAFE_END: &str = "(?:$|\\?|#|/)";
const SCHEME_HOST: &str = "^(?:https?://)?(?:www\\.)?archiveofourown\\.org";
const NUMBER: &str = "\\d{1,3}(?:,?\\d{3})*";

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(
    WORK_URL_REGEX,
    format!(r"{}/(?:collections/[^/?#]+/)?works/(\d+){}", SCHEME_HOST, SAFE_END).as_str()
);
// Work page (`/works/{id}`), not the download format.
selector!(STATS_SELECTOR, "dl.stats");
selector!(PUBLISHED_SELECTOR, "dl.stats dd.published");
selector!(STATUS_SELECTOR, "dl.stats dd.status");
selector!(WORDS_SELECTOR, "dl.stats dd.words");
selector!(CHAPTERS_SELECTOR, "dl.stats dd.chapters");
selector!(TITLE_SELECTOR, "#workskin .preface h2.title");
selector!(BYLINE_SELECTOR, "#workskin .preface .byline a[rel='author']");
regex!(CHAPTERS_REGEX, format!(r"^({NUMBER})\s*/\s*({NUMBER}|\?)$").as_str());
regex!(WORDS_REGEX, format!(r"^({NUMBER})$").as_str());
regex!(DATE_REGEX, r"^(\d{4})-(\d{1,2})-(\d{1,2})$");
