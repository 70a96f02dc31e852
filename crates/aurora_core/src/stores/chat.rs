//! Assistant chat widget state.
//!
//! # Responsibility
//! - Persist widget flags and the avatar directive for the browser session.
//! - Keep message history and the voice engine in memory only.
//! - Drive the avatar from classified assistant replies.
//!
//! # Invariants
//! - Message history and the voice engine reset on every process start.
//! - An absent chat id is represented by the key being absent from storage.

use super::{
    CHAT_EMOTION_KEY, CHAT_EXPRESSION_KEY, CHAT_HAS_INTERACTED_KEY, CHAT_ID_KEY, CHAT_MOTION_KEY,
    CHAT_OPEN_KEY,
};
use crate::emotion::{EmotionClassifier, EmotionDirective};
use crate::reactive::{Atom, PersistedAtom, Subscription, WriteThrough};
use crate::storage::StorageAdapter;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    /// Classified emotion; set for assistant replies only.
    pub emotion: Option<String>,
}

/// Text-to-speech engine attached to the widget.
pub trait VoiceEngine: Send + Sync {
    fn name(&self) -> &str;
    fn speak(&self, text: &str);
    fn cancel(&self);
}

#[derive(Clone)]
pub struct ChatStore {
    chat_id: WriteThrough<Option<u64>, Option<u64>>,
    open: PersistedAtom<bool>,
    has_interacted: PersistedAtom<bool>,
    emotion: PersistedAtom<String>,
    expression: PersistedAtom<String>,
    motion: PersistedAtom<String>,
    messages: Atom<Vec<ChatMessage>>,
    voice: Atom<Option<Arc<dyn VoiceEngine>>>,
}

impl ChatStore {
    pub fn new(storage: &StorageAdapter) -> Self {
        let neutral = EmotionDirective::neutral();
        let writer = storage.clone();
        let chat_id = WriteThrough::new(
            Atom::new(CHAT_ID_KEY, storage.load::<Option<u64>>(CHAT_ID_KEY, None)),
            move |next: Option<u64>| {
                match next {
                    Some(id) => writer.save(CHAT_ID_KEY, &id),
                    None => writer.remove(CHAT_ID_KEY),
                }
                next
            },
        );

        Self {
            chat_id,
            open: PersistedAtom::new(CHAT_OPEN_KEY, false, storage),
            has_interacted: PersistedAtom::new(CHAT_HAS_INTERACTED_KEY, false, storage),
            emotion: PersistedAtom::new(CHAT_EMOTION_KEY, neutral.emotion, storage),
            expression: PersistedAtom::new(CHAT_EXPRESSION_KEY, neutral.expression, storage),
            motion: PersistedAtom::new(CHAT_MOTION_KEY, neutral.motion, storage),
            messages: Atom::new("chat_messages", Vec::new()),
            voice: Atom::new("chat_voice_engine", None),
        }
    }

    pub fn chat_id(&self) -> Option<u64> {
        self.chat_id.get()
    }

    pub fn set_chat_id(&self, chat_id: Option<u64>) {
        self.chat_id.set(chat_id);
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn open(&self) {
        self.open.set(true);
    }

    pub fn close(&self) {
        self.open.set(false);
    }

    /// Flips the widget and returns the new state.
    pub fn toggle(&self) -> bool {
        self.open.update(|open| !open);
        self.open.get()
    }

    pub fn has_interacted(&self) -> bool {
        self.has_interacted.get()
    }

    pub fn mark_interacted(&self) {
        if !self.has_interacted.get() {
            self.has_interacted.set(true);
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.get()
    }

    /// Records a user turn; returns its message id.
    pub fn push_user_message(&self, text: impl Into<String>) -> Uuid {
        self.mark_interacted();
        self.push(ChatRole::User, text.into(), None)
    }

    /// Records an assistant turn and points the avatar at its emotion.
    pub fn receive_assistant_reply(
        &self,
        text: impl Into<String>,
        classifier: &EmotionClassifier,
    ) -> EmotionDirective {
        let text = text.into();
        let directive = classifier.classify(&text);
        debug!(
            "event=chat_reply module=stores status=ok emotion={} expression={} motion={}",
            directive.emotion, directive.expression, directive.motion
        );

        if let Some(engine) = self.voice.get() {
            engine.speak(&text);
        }
        self.push(ChatRole::Assistant, text, Some(directive.emotion.clone()));
        self.set_avatar(&directive);
        directive
    }

    /// Current avatar directive as persisted.
    pub fn avatar(&self) -> EmotionDirective {
        EmotionDirective {
            emotion: self.emotion.get(),
            expression: self.expression.get(),
            motion: self.motion.get(),
        }
    }

    pub fn set_avatar(&self, directive: &EmotionDirective) {
        self.emotion.set(directive.emotion.clone());
        self.expression.set(directive.expression.clone());
        self.motion.set(directive.motion.clone());
    }

    pub fn subscribe_avatar_emotion(
        &self,
        listener: impl Fn(&String) + Send + Sync + 'static,
    ) -> Subscription {
        self.emotion.subscribe(listener)
    }

    pub fn subscribe_messages(
        &self,
        listener: impl Fn(&Vec<ChatMessage>) + Send + Sync + 'static,
    ) -> Subscription {
        self.messages.subscribe(listener)
    }

    /// Starts a fresh conversation: clears history and chat id, calms the
    /// avatar and silences any speech in progress.
    pub fn reset_conversation(&self) {
        if let Some(engine) = self.voice.get() {
            engine.cancel();
        }
        self.messages.set(Vec::new());
        self.set_chat_id(None);
        self.set_avatar(&EmotionDirective::neutral());
    }

    pub fn install_voice_engine(&self, engine: Arc<dyn VoiceEngine>) {
        self.voice.set(Some(engine));
    }

    pub fn voice_engine(&self) -> Option<Arc<dyn VoiceEngine>> {
        self.voice.get()
    }

    pub fn clear_voice_engine(&self) {
        if let Some(engine) = self.voice.get() {
            engine.cancel();
        }
        self.voice.set(None);
    }

    fn push(&self, role: ChatRole, text: String, emotion: Option<String>) -> Uuid {
        let id = Uuid::new_v4();
        let message = ChatMessage {
            id,
            role,
            text,
            emotion,
        };
        self.messages.update(move |messages| {
            let mut next = messages.clone();
            next.push(message);
            next
        });
        id
    }
}
