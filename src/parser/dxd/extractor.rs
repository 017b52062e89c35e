// Channel records from the embedded setup document.
use super::metadata::{
    dedupe_names, default_channel_name, valid_sample_rate, valid_scale, ChannelDescriptor,
    ChannelField, CHANNEL_COUNT_KEYS,
};
use super::{DxdDataType, LoaderConfig};
use roxmltree::{Document, Node};
use tracing::{debug, warn};

/// Element paths that may hold repeated channel records, tried in order.
/// The last segment is the record element, earlier segments are its direct parents.
const CHANNEL_PATHS: &[&[&str]] = &[
    &["Channels", "Channel"],
    &["ChannelList", "Channel"],
    &["AnalogChannels", "Channel"],
    &["Device", "Channel"],
    &["Channel"],
    &["channels", "channel"],
    &["channel"],
];

const MAX_DECLARED_CHANNELS: usize = 4096;

/// `None` when the block is not well-formed markup or names no channels at all.
pub fn extract_channels(block: &[u8], config: &LoaderConfig) -> Option<Vec<ChannelDescriptor>> {
    let text = String::from_utf8_lossy(block);
    let doc = match Document::parse(&text) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Configuration block is not valid markup: {}", e);
            return None;
        }
    };
    let root = doc.root_element();

    for path in CHANNEL_PATHS {
        let records = find_all(root, path);
        if records.is_empty() {
            continue;
        }
        debug!("Found {} channel records at {}", records.len(), path.join("/"));
        let mut channels: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(i, node)| descriptor_from_record(*node, i, config))
            .collect();
        dedupe_names(&mut channels);
        return Some(channels);
    }

    let count = lookup(root, CHANNEL_COUNT_KEYS)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|n| (1..=MAX_DECLARED_CHANNELS).contains(n))?;
    debug!("No channel records; root declares {} channels", count);
    Some((0..count).map(|i| ChannelDescriptor::with_defaults(i, config)).collect())
}

fn descriptor_from_record(node: Node, index: usize, config: &LoaderConfig) -> ChannelDescriptor {
    let field = |f: ChannelField| lookup(node, f.candidate_keys());
    let number = |f: ChannelField| field(f).and_then(|v| parse_number(&v));

    ChannelDescriptor {
        name: field(ChannelField::Name).unwrap_or_else(|| default_channel_name(index)),
        index,
        sample_rate_hz: number(ChannelField::SampleRate)
            .and_then(valid_sample_rate)
            .unwrap_or(config.default_sample_rate_hz),
        units: field(ChannelField::Units).unwrap_or_default(),
        scale: number(ChannelField::Scale).and_then(valid_scale).unwrap_or(1.0),
        offset: number(ChannelField::Offset)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        data_type: field(ChannelField::DataType)
            .map(|v| DxdDataType::from_string(&v))
            .unwrap_or(config.default_data_type),
        num_samples: 0,
        description: field(ChannelField::Description),
    }
}

/// Exact key match first (attribute, then child element text), then a
/// case-insensitive pass over the same keys.
fn lookup(node: Node, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value_of(node, |candidate| candidate == *key))
        .or_else(|| {
            keys.iter()
                .find_map(|key| value_of(node, |candidate| candidate.eq_ignore_ascii_case(key)))
        })
}

fn value_of(node: Node, matches: impl Fn(&str) -> bool) -> Option<String> {
    let from_attribute = node
        .attributes()
        .find(|attr| matches(attr.name()))
        .map(|attr| attr.value().trim().to_string());
    let from_child = || {
        node.children()
            .filter(|child| child.is_element() && matches(child.tag_name().name()))
            .find_map(|child| child.text())
            .map(|text| text.trim().to_string())
    };
    from_attribute
        .or_else(from_child)
        .filter(|value| !value.is_empty())
}

/// Leading numeric token, so "1000 Hz" reads as 1000.
fn parse_number(value: &str) -> Option<f64> {
    value.split_whitespace().next()?.parse::<f64>().ok()
}

/// Descendants of `root` (excluding it) named like the last segment whose
/// direct parent chain matches the earlier segments.
fn find_all<'a, 'input: 'a>(root: Node<'a, 'input>, path: &[&str]) -> Vec<Node<'a, 'input>> {
    let Some((leaf, parents)) = path.split_last() else {
        return Vec::new();
    };
    root.descendants()
        .skip(1)
        .filter(|node| node.is_element() && node.tag_name().name() == *leaf)
        .filter(|node| {
            let mut current = *node;
            for expected in parents.iter().rev() {
                match current.parent_element() {
                    Some(parent) if parent.tag_name().name() == *expected => current = parent,
                    _ => return false,
                }
            }
            true
        })
        .collect()
}
