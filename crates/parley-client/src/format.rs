//! Display formatting of message text: mentions, links and emoticons.
//!
//! Message text is user input. [`MessageFormatter::render`] first strips any
//! markup from it, then layers the formatter's own tags on top. The
//! individual steps only rewrite text outside of tags and links, so a later
//! step never reaches into the markup of an earlier one.

use ammonia::Builder;
use parley_shared::models::UserRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MentionOptions {
    /// Render mentions as plain `@name` instead of profile links.
    pub skip_link: bool,
}

pub trait MessageFormatter {
    /// Remove markup from raw message text, escaping what is left.
    fn sanitize(&self, text: &str) -> String;

    /// Replace `@<user id>` markup with the mentioned user's name.
    fn parse_mentions(&self, text: &str, mentions: &[UserRef], options: MentionOptions) -> String;

    /// Turn bare URLs into anchors.
    fn linkify(&self, text: &str) -> String;

    /// Replace `:name:` emoticon codes with images.
    fn emoticonify(&self, text: &str) -> String;

    /// Full pipeline over raw message text: sanitize, mentions, links,
    /// emoticons.
    fn render(&self, text: &str, mentions: &[UserRef], options: MentionOptions) -> String {
        let text = self.sanitize(text);
        let text = self.parse_mentions(&text, mentions, options);
        let text = self.linkify(&text);
        self.emoticonify(&text)
    }
}

const EMOTICONS: &[&str] = &[
    "smile", "laughing", "wink", "heart", "thumbsup", "thumbsdown", "cry", "angry", "tada", "ok_hand",
];

/// HTML renderer used by the web client.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFormatter;

impl MessageFormatter for HtmlFormatter {
    fn sanitize(&self, text: &str) -> String {
        Builder::empty().clean(text).to_string()
    }

    fn parse_mentions(&self, text: &str, mentions: &[UserRef], options: MentionOptions) -> String {
        mentions.iter().fold(text.to_string(), |acc, user| {
            let markup = format!("@{}", user.id);
            let label = self.sanitize(user.label());
            let rendered = if options.skip_link {
                format!("@{label}")
            } else {
                format!(
                    "<a href=\"#/profile/{}/details/view\">@{label}</a>",
                    ammonia::clean_text(user.id.as_str()),
                )
            };
            acc.replace(&markup, &rendered)
        })
    }

    fn linkify(&self, text: &str) -> String {
        map_text(text, |run| {
            let mut out = String::with_capacity(run.len());
            for piece in run.split_inclusive(char::is_whitespace) {
                let word = piece.trim_end();
                let space = &piece[word.len()..];
                let url = word.trim_end_matches(['.', ',', ';', '!', '?', ')']);
                let rest = &word[url.len()..];

                if is_url(url) {
                    let href = if url.starts_with("www.") {
                        format!("http://{url}")
                    } else {
                        url.to_string()
                    };
                    out.push_str(&format!("<a href=\"{href}\" target=\"_blank\">{url}</a>"));
                    out.push_str(rest);
                } else {
                    out.push_str(word);
                }
                out.push_str(space);
            }
            out
        })
    }

    fn emoticonify(&self, text: &str) -> String {
        map_text(text, |run| {
            let mut out = String::with_capacity(run.len());
            let mut rest = run;
            while let Some(start) = rest.find(':') {
                out.push_str(&rest[..start]);
                let after = &rest[start + 1..];
                match after.find(':') {
                    Some(end) if EMOTICONS.contains(&&after[..end]) => {
                        let name = &after[..end];
                        out.push_str(&format!(
                            "<img class=\"chat-emoji\" src=\"/images/emoji/{name}.png\" alt=\":{name}:\">"
                        ));
                        rest = &after[end + 1..];
                    }
                    _ => {
                        out.push(':');
                        rest = after;
                    }
                }
            }
            out.push_str(rest);
            out
        })
    }
}

/// Apply `f` to the text between tags of `html`. Tags are copied as they
/// are, and so is everything inside an anchor.
fn map_text(html: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&f(&rest[..start]));
        let tail = &rest[start..];
        let skip = if tail.starts_with("<a ") {
            tail.find("</a>").map(|end| end + "</a>".len())
        } else {
            tail.find('>').map(|end| end + 1)
        }
        .unwrap_or(tail.len());
        out.push_str(&tail[..skip]);
        rest = &tail[skip..];
    }
    out.push_str(&f(rest));
    out
}

/// A candidate holding quotes stays plain text, it cannot sit in an `href`.
fn is_url(word: &str) -> bool {
    !word.contains(['"', '\''])
        && ["http://", "https://", "www."]
            .iter()
            .any(|prefix| word.len() > prefix.len() && word.starts_with(prefix))
}
