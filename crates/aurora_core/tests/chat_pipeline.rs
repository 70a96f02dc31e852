use aurora_core::stores::chat::{ChatRole, ChatStore, VoiceEngine};
use aurora_core::stores::{CHAT_EMOTION_KEY, CHAT_ID_KEY, CHAT_MOTION_KEY, CHAT_OPEN_KEY};
use aurora_core::{
    EmotionClassifier, EmotionDirective, MemoryStorage, StorageAdapter, StorageBackend,
};
use std::sync::{Arc, Mutex};

fn session_storage() -> (Arc<MemoryStorage>, StorageAdapter) {
    let backend = Arc::new(MemoryStorage::new());
    let storage = StorageAdapter::new(backend.clone());
    (backend, storage)
}

#[derive(Default)]
struct RecordingVoice {
    spoken: Mutex<Vec<String>>,
    cancels: Mutex<usize>,
}

impl VoiceEngine for RecordingVoice {
    fn name(&self) -> &str {
        "recording"
    }

    fn speak(&self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }

    fn cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }
}

#[test]
fn assistant_reply_drives_persisted_avatar() {
    let (backend, storage) = session_storage();
    let chat = ChatStore::new(&storage);
    let classifier = EmotionClassifier::builtin().unwrap();

    assert_eq!(chat.avatar(), EmotionDirective::neutral());

    let directive = chat.receive_assistant_reply("¡Gracias por tu compra!", &classifier);
    assert_eq!(directive.emotion, "happy");
    assert_eq!(chat.avatar(), directive);
    assert_eq!(
        backend.get_item(CHAT_EMOTION_KEY).unwrap().as_deref(),
        Some("\"happy\"")
    );
    assert_eq!(
        backend.get_item(CHAT_MOTION_KEY).unwrap().as_deref(),
        Some("\"nod\"")
    );

    let messages = chat.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, ChatRole::Assistant);
    assert_eq!(messages[0].emotion.as_deref(), Some("happy"));
}

#[test]
fn neutral_reply_calms_avatar() {
    let (_backend, storage) = session_storage();
    let chat = ChatStore::new(&storage);
    let classifier = EmotionClassifier::builtin().unwrap();

    chat.receive_assistant_reply("wow, what a deal", &classifier);
    assert_eq!(chat.avatar().emotion, "surprised");

    chat.receive_assistant_reply("Your order ships tomorrow.", &classifier);
    assert!(chat.avatar().is_neutral());
}

#[test]
fn messages_are_memory_only_but_widget_state_persists() {
    let (_backend, storage) = session_storage();
    let classifier = EmotionClassifier::builtin().unwrap();
    {
        let chat = ChatStore::new(&storage);
        chat.open();
        chat.set_chat_id(Some(42));
        chat.push_user_message("hola");
        chat.receive_assistant_reply("Lo siento, está agotado", &classifier);
        assert_eq!(chat.messages().len(), 2);
    }

    let restored = ChatStore::new(&storage);
    assert!(restored.messages().is_empty());
    assert!(restored.is_open());
    assert!(restored.has_interacted());
    assert_eq!(restored.chat_id(), Some(42));
    assert_eq!(restored.avatar().emotion, "sad");
}

#[test]
fn clearing_chat_id_removes_key() {
    let (backend, storage) = session_storage();
    let chat = ChatStore::new(&storage);

    chat.set_chat_id(Some(7));
    assert_eq!(backend.get_item(CHAT_ID_KEY).unwrap().as_deref(), Some("7"));

    chat.set_chat_id(None);
    assert_eq!(backend.get_item(CHAT_ID_KEY).unwrap(), None);
    assert_eq!(ChatStore::new(&storage).chat_id(), None);
}

#[test]
fn toggle_flips_and_persists_open_flag() {
    let (backend, storage) = session_storage();
    let chat = ChatStore::new(&storage);

    assert!(chat.toggle());
    assert_eq!(
        backend.get_item(CHAT_OPEN_KEY).unwrap().as_deref(),
        Some("true")
    );
    assert!(!chat.toggle());
    chat.close();
    assert!(!chat.is_open());
}

#[test]
fn voice_engine_speaks_replies_and_cancels_on_reset() {
    let (_backend, storage) = session_storage();
    let chat = ChatStore::new(&storage);
    let classifier = EmotionClassifier::builtin().unwrap();
    let voice = Arc::new(RecordingVoice::default());

    chat.install_voice_engine(voice.clone());
    assert_eq!(chat.voice_engine().unwrap().name(), "recording");

    chat.push_user_message("hello");
    chat.receive_assistant_reply("Hello! Welcome back.", &classifier);
    assert_eq!(*voice.spoken.lock().unwrap(), vec!["Hello! Welcome back."]);

    chat.set_chat_id(Some(3));
    chat.reset_conversation();
    assert_eq!(*voice.cancels.lock().unwrap(), 1);
    assert!(chat.messages().is_empty());
    assert_eq!(chat.chat_id(), None);
    assert!(chat.avatar().is_neutral());

    chat.clear_voice_engine();
    assert!(chat.voice_engine().is_none());
    assert_eq!(*voice.cancels.lock().unwrap(), 2);
}

#[test]
fn avatar_subscribers_see_each_new_emotion() {
    let (_backend, storage) = session_storage();
    let chat = ChatStore::new(&storage);
    let classifier = EmotionClassifier::builtin().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = chat.subscribe_avatar_emotion(move |emotion| {
        sink.lock().unwrap().push(emotion.clone());
    });

    chat.receive_assistant_reply("hmm, maybe", &classifier);
    chat.receive_assistant_reply("the payment failed", &classifier);

    assert_eq!(*seen.lock().unwrap(), vec!["thinking", "angry"]);
}
