use retort::channel::ReplyTarget;
use retort::channel::update::{Ignored, Update};
use serde_json::json;

fn update(message: serde_json::Value) -> Update {
    serde_json::from_value(json!({"update_id": 10, "message": message})).unwrap()
}

#[test]
fn group_message_becomes_inbound_event() {
    let event = update(json!({
        "message_id": 55,
        "from": {"id": 42, "is_bot": false, "first_name": "Ana", "last_name": "Souza"},
        "chat": {"id": -1001, "type": "supergroup", "title": "jogos"},
        "date": 1700000000,
        "text": "meu pc travou"
    }))
    .into_event()
    .unwrap();

    assert_eq!(event.text.as_deref(), Some("meu pc travou"));
    assert_eq!(event.conversation_id, -1001);
    assert_eq!(event.message_id, Some(55));
    assert_eq!(event.chat_kind, "supergroup");
    assert_eq!(event.sender.id, 42);
    assert_eq!(event.sender.full_name, "Ana Souza");
    assert!(event.replied_to.is_none());

    let target = ReplyTarget::for_event(&event);
    assert_eq!(target.conversation_id, -1001);
    assert_eq!(target.reply_to_message_id, Some(55));
}

#[test]
fn reply_context_is_carried_over() {
    let event = update(json!({
        "message_id": 56,
        "from": {"id": 42, "first_name": "Ana"},
        "chat": {"id": 42, "type": "private"},
        "text": "eu sei",
        "reply_to_message": {
            "message_id": 50,
            "from": {"id": 777, "is_bot": true, "first_name": "Retort"},
            "chat": {"id": 42, "type": "private"},
            "text": "zoomer momento"
        }
    }))
    .into_event()
    .unwrap();

    let replied = event.replied_to.unwrap();
    assert_eq!(replied.sender_id, Some(777));
    assert_eq!(replied.text.as_deref(), Some("zoomer momento"));
    assert_eq!(event.sender.full_name, "Ana");
}

#[test]
fn replied_media_caption_is_used_as_text() {
    let event = update(json!({
        "message_id": 57,
        "chat": {"id": 1, "type": "private"},
        "text": "kkk",
        "reply_to_message": {
            "message_id": 51,
            "from": {"id": 777, "first_name": "Retort"},
            "chat": {"id": 1, "type": "private"},
            "caption": "console de zoomer"
        }
    }))
    .into_event()
    .unwrap();

    assert_eq!(
        event.replied_to.unwrap().text.as_deref(),
        Some("console de zoomer")
    );
}

#[test]
fn commands_are_ignored() {
    let with_entity = update(json!({
        "message_id": 1,
        "chat": {"id": 1, "type": "private"},
        "text": "/start pc",
        "entities": [{"type": "bot_command", "offset": 0, "length": 6}]
    }));
    assert_eq!(with_entity.into_event().unwrap_err(), Ignored::Command);

    let bare_slash = update(json!({
        "message_id": 2,
        "chat": {"id": 1, "type": "private"},
        "text": "/pc"
    }));
    assert_eq!(bare_slash.into_event().unwrap_err(), Ignored::Command);
}

#[test]
fn mention_entity_is_not_a_command() {
    let event = update(json!({
        "message_id": 3,
        "chat": {"id": 1, "type": "group"},
        "text": "@retort_bot pc",
        "entities": [{"type": "mention", "offset": 0, "length": 12}]
    }))
    .into_event()
    .unwrap();
    assert_eq!(event.text.as_deref(), Some("@retort_bot pc"));
}

#[test]
fn update_without_message_is_ignored() {
    let update: Update = serde_json::from_value(json!({
        "update_id": 11,
        "edited_message": {"message_id": 1, "chat": {"id": 1, "type": "private"}, "text": "pc"}
    }))
    .unwrap();
    assert_eq!(update.into_event().unwrap_err(), Ignored::NoMessage);
}

#[test]
fn sticker_message_has_no_text() {
    let event = update(json!({
        "message_id": 4,
        "chat": {"id": 1, "type": "private"},
        "sticker": {"file_id": "STK"}
    }))
    .into_event()
    .unwrap();
    assert!(event.text.is_none());
}

#[test]
fn media_caption_is_used_as_text() {
    let event = update(json!({
        "message_id": 5,
        "from": {"id": 42, "first_name": "Ana"},
        "chat": {"id": -1001, "type": "group"},
        "photo": [],
        "caption": "meu pc travou"
    }))
    .into_event()
    .unwrap();
    assert_eq!(event.text.as_deref(), Some("meu pc travou"));
    assert_eq!(event.message_id, Some(5));
}

#[test]
fn text_takes_priority_over_caption() {
    let event = update(json!({
        "message_id": 6,
        "chat": {"id": 1, "type": "private"},
        "text": "pc",
        "caption": "ignored"
    }))
    .into_event()
    .unwrap();
    assert_eq!(event.text.as_deref(), Some("pc"));
}
