use rtrb::Consumer;

/// Note control for a single track
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NoteMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    AllNotesOff,
}

/// A note message stamped with the simulated time it takes effect
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimedMessage {
    /// Seconds from the start of the render
    pub time: f64,
    pub message: NoteMessage,
}

impl TimedMessage {
    /// Frame index this message lands on at `sample_rate`
    pub fn frame(&self, sample_rate: f32) -> usize {
        (self.time * sample_rate as f64).round().max(0.0) as usize
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<TimedMessage>;
}

impl MessageReceiver for Consumer<TimedMessage> {
    fn pop(&mut self) -> Option<TimedMessage> {
        Consumer::pop(self).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    #[test]
    fn frame_rounds_to_nearest_sample() {
        let msg = TimedMessage {
            time: 0.5,
            message: NoteMessage::AllNotesOff,
        };
        assert_eq!(msg.frame(44_100.0), 22_050);

        let early = TimedMessage { time: -1.0, ..msg };
        assert_eq!(early.frame(44_100.0), 0);
    }

    #[test]
    fn consumer_drains_in_order() {
        let (mut tx, mut rx) = RingBuffer::<TimedMessage>::new(4);
        for t in [0.1, 0.2] {
            tx.push(TimedMessage {
                time: t,
                message: NoteMessage::NoteOff { note: 60 },
            })
            .unwrap();
        }

        let rx: &mut dyn MessageReceiver = &mut rx;
        assert_eq!(rx.pop().map(|m| m.time), Some(0.1));
        assert_eq!(rx.pop().map(|m| m.time), Some(0.2));
        assert!(rx.pop().is_none());
    }
}
