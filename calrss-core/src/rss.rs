use chrono::{DateTime, Utc};

use crate::{Result, feed::FeedItem, types::ChannelInfo};

/// RSS 2.0 document generator.
///
/// Renders the ordered item list the merge engine produced, plus the
/// run-level channel metadata. Items are emitted exactly in the order
/// given.
pub struct RssGenerator {
    channel: ChannelInfo,
}

impl RssGenerator {
    pub fn new(channel: ChannelInfo) -> Self {
        Self { channel }
    }

    /// Generates the complete feed document.
    pub fn generate(&self, items: &[FeedItem]) -> Result<String> {
        let mut rss_content = String::new();

        rss_content.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        rss_content.push_str(&format!(
            "<rss version=\"2.0\" xml:lang=\"{}\">\n",
            xml_escape(&self.channel.language)
        ));
        rss_content.push_str("  <channel>\n");
        rss_content.push_str(&format!("    <title>{}</title>\n", cdata(&self.channel.title)));
        rss_content.push_str(&format!(
            "    <link>{}</link>\n",
            xml_escape(&self.channel.link)
        ));
        rss_content.push_str(&format!(
            "    <description>{}</description>\n",
            cdata(&self.channel.description)
        ));
        rss_content.push_str(&format!(
            "    <language>{}</language>\n",
            xml_escape(&self.channel.language)
        ));
        rss_content.push_str(&format!(
            "    <generator>calrss/{}</generator>\n",
            env!("CARGO_PKG_VERSION")
        ));

        for item in items {
            self.add_item(&mut rss_content, item);
        }

        rss_content.push_str("  </channel>\n</rss>\n");

        Ok(rss_content)
    }

    /// Adds a single feed item.
    fn add_item(&self, rss_content: &mut String, item: &FeedItem) {
        rss_content.push_str("    <item>\n");
        rss_content.push_str(&format!("      <title>{}</title>\n", cdata(&item.title)));
        rss_content.push_str(&format!("      <link>{}</link>\n", xml_escape(&item.link)));
        rss_content.push_str(&format!(
            "      <description>{}</description>\n",
            cdata(&item.description)
        ));
        if let Some(ref category) = item.category {
            rss_content.push_str(&format!("      <category>{}</category>\n", cdata(category)));
        }
        rss_content.push_str(&format!(
            "      <pubDate>{}</pubDate>\n",
            format_pub_date(&item.pub_date)
        ));
        rss_content.push_str(&format!("      <guid>{}</guid>\n", xml_escape(&item.guid)));
        rss_content.push_str("    </item>\n");
    }
}

impl Default for RssGenerator {
    fn default() -> Self {
        Self::new(ChannelInfo::default())
    }
}

/// RFC-822 timestamp in UTC, e.g. "Wed, 02 Oct 2002 13:00:00 GMT".
fn format_pub_date(instant: &DateTime<Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Escapes text placed directly into element content.
fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wraps text in a CDATA section, splitting any embedded terminator.
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}
