use serde::Deserialize;

use sweeper_proto::ResourceItem;

/// Channel type discriminator for a one-on-one private conversation.
pub const DIRECT_MESSAGE: u8 = 1;

/// One entry of `GET /users/@me/relationships`.
#[derive(Debug, Deserialize)]
pub struct RelationshipDto {
    pub id: String,
}

/// One entry of `GET /users/@me/channels`.
#[derive(Debug, Deserialize)]
pub struct ChannelDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

/// Map the relationships listing into deletable items.
pub fn connections_from(relationships: Vec<RelationshipDto>) -> Vec<ResourceItem> {
    relationships
        .into_iter()
        .map(|r| ResourceItem::Connection { id: r.id })
        .collect()
}

/// Map the channel listing into deletable items, keeping only private
/// one-on-one conversations.
pub fn conversations_from(channels: Vec<ChannelDto>) -> Vec<ResourceItem> {
    channels
        .into_iter()
        .filter(|c| c.kind == DIRECT_MESSAGE)
        .map(|c| ResourceItem::Conversation { id: c.id })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationships_map_in_order() {
        let dtos: Vec<RelationshipDto> =
            serde_json::from_str(r#"[{"id": "11", "type": 1}, {"id": "22", "type": 1}]"#).unwrap();
        let items = connections_from(dtos);
        assert_eq!(
            items,
            vec![
                ResourceItem::Connection {
                    id: "11".to_string()
                },
                ResourceItem::Connection {
                    id: "22".to_string()
                },
            ]
        );
    }

    #[test]
    fn group_channels_are_filtered_out() {
        let dtos: Vec<ChannelDto> = serde_json::from_str(
            r#"[{"id": "1", "type": 1}, {"id": "2", "type": 3}, {"id": "3", "type": 1}]"#,
        )
        .unwrap();
        let items = conversations_from(dtos);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| matches!(i, ResourceItem::Conversation { .. })));
        assert_eq!(items[0].id(), "1");
        assert_eq!(items[1].id(), "3");
    }

    #[test]
    fn empty_listings_map_to_empty() {
        assert!(connections_from(Vec::new()).is_empty());
        assert!(conversations_from(Vec::new()).is_empty());
    }
}
