// Lock-free SPSC channels
//
// Voices travel UI -> audio, notifications travel audio -> UI. Both sides
// use try operations only; a full buffer drops the message rather than
// blocking either thread.

use ringbuf::{HeapRb, traits::Split};

use crate::engine::voice::Voice;
use crate::messaging::notification::Notification;

pub type VoiceProducer = ringbuf::HeapProd<Voice>;
pub type VoiceConsumer = ringbuf::HeapCons<Voice>;

pub fn create_voice_channel(capacity: usize) -> (VoiceProducer, VoiceConsumer) {
    let rb = HeapRb::<Voice>::new(capacity);
    rb.split()
}

pub type NotificationProducer = ringbuf::HeapProd<Notification>;
pub type NotificationConsumer = ringbuf::HeapCons<Notification>;

pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    let rb = HeapRb::<Notification>::new(capacity);
    rb.split()
}
