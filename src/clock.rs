//! In-game time. One task advances it; everyone else reads copies.

use crate::content::ContentRegistry;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const MINUTES_PER_DAY: u64 = 24 * 60;
const DAWN: u64 = 6 * 60;
const DUSK: u64 = 20 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GameTime {
    pub day: u32,
    pub hour: u8,
    pub minute: u8,
}

impl Default for GameTime {
    /// Day one, eight in the morning.
    fn default() -> Self {
        Self { day: 1, hour: 8, minute: 0 }
    }
}

impl GameTime {
    /// Minutes since 00:00 on day zero.
    pub fn total_minutes(&self) -> u64 {
        self.day as u64 * MINUTES_PER_DAY + self.hour as u64 * 60 + self.minute as u64
    }

    pub fn from_minutes(total: u64) -> Self {
        let day = (total / MINUTES_PER_DAY).min(u32::MAX as u64) as u32;
        let in_day = total % MINUTES_PER_DAY;
        Self {
            day,
            hour: (in_day / 60) as u8,
            minute: (in_day % 60) as u8,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60
    }

    pub fn is_night(&self) -> bool {
        let m = self.hour as u64 * 60 + self.minute as u64;
        !(DAWN..DUSK).contains(&m)
    }

    /// Move forward `minutes`, returning the time reached and every event passed on the way,
    /// in order.
    pub fn advance(self, minutes: u32) -> (GameTime, Vec<ClockEvent>) {
        let before = self.total_minutes();
        let after = before + minutes as u64;

        let mut events = Vec::new();
        for day in before / MINUTES_PER_DAY..=after / MINUTES_PER_DAY {
            let start = day * MINUTES_PER_DAY;
            let d = day.min(u32::MAX as u64) as u32;
            for (at, ev) in [
                (start, ClockEvent::NewDay { day: d }),
                (start + DAWN, ClockEvent::Dawn { day: d }),
                (start + DUSK, ClockEvent::Dusk { day: d }),
            ] {
                if before < at && at <= after {
                    events.push(ev);
                }
            }
        }

        (GameTime::from_minutes(after), events)
    }
}

impl std::fmt::Display for GameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "day {}, {:02}:{:02}", self.day, self.hour, self.minute)
    }
}

/// Something that happened on the world clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    NewDay { day: u32 },
    Dawn { day: u32 },
    Dusk { day: u32 },
}

impl ClockEvent {
    /// What online characters are told, if anything.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ClockEvent::NewDay { .. } => None,
            ClockEvent::Dawn { .. } => Some("The sky over the sprawl turns a dirty grey. Dawn breaks."),
            ClockEvent::Dusk { .. } => Some("Neon flickers to life as the sun sinks behind the arcologies."),
        }
    }
}

pub struct WorldClock {
    time: RwLock<GameTime>,
    minutes_per_tick: u32,
    tick_interval: Duration,
    events: broadcast::Sender<ClockEvent>,
}

impl WorldClock {
    pub fn new(start: GameTime, minutes_per_tick: u32, tick_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            time: RwLock::new(start),
            minutes_per_tick,
            tick_interval,
            events,
        }
    }

    /// Current time (a copy).
    pub fn now(&self) -> GameTime {
        *self.time.read()
    }

    /// Advance by one tick. Only the clock task calls this.
    pub fn tick(&self) -> Vec<ClockEvent> {
        let mut time = self.time.write();
        let (next, events) = time.advance(self.minutes_per_tick);
        *time = next;
        events
    }

    /// Typed event feed for anyone besides the online characters who cares.
    pub fn subscribe(&self) -> broadcast::Receiver<ClockEvent> {
        self.events.subscribe()
    }

    /// Spawn the single writer task. Each tick's events go to every online character.
    pub fn spawn(self: &Arc<Self>, content: Arc<ContentRegistry>) -> tokio::task::JoinHandle<()> {
        let clock = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(clock.tick_interval);
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                for event in clock.tick() {
                    tracing::debug!(?event, time = %clock.now(), "clock event");
                    let _ = clock.events.send(event);
                    notify_online(&content, event);
                }
            }
        })
    }
}

fn notify_online(content: &ContentRegistry, event: ClockEvent) {
    let Some(msg) = event.message() else {
        return;
    };
    for out in content.online_characters().iter().filter_map(|c| c.output()) {
        out.notify(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_crosses_dawn_and_midnight() {
        let t = GameTime { day: 1, hour: 23, minute: 50 };
        let (t, events) = t.advance(20);
        assert_eq!(t, GameTime { day: 2, hour: 0, minute: 10 });
        assert_eq!(events, vec![ClockEvent::NewDay { day: 2 }]);

        let (t, events) = GameTime { day: 2, hour: 5, minute: 59 }.advance(1);
        assert_eq!(t.hour, 6);
        assert_eq!(events, vec![ClockEvent::Dawn { day: 2 }]);
    }

    #[test]
    fn long_advance_reports_in_order() {
        let (_, events) = GameTime { day: 1, hour: 19, minute: 0 }.advance(24 * 60);
        assert_eq!(
            events,
            vec![
                ClockEvent::Dusk { day: 1 },
                ClockEvent::NewDay { day: 2 },
                ClockEvent::Dawn { day: 2 },
            ]
        );
    }

    #[test]
    fn night_window() {
        assert!(GameTime { day: 1, hour: 3, minute: 0 }.is_night());
        assert!(!GameTime { day: 1, hour: 12, minute: 0 }.is_night());
        assert!(GameTime { day: 1, hour: 20, minute: 0 }.is_night());
    }

    /// One writer, many readers: every observed time is well formed and never goes back.
    #[test]
    fn concurrent_readers_see_consistent_time() {
        let clock = Arc::new(WorldClock::new(GameTime::default(), 7, Duration::from_millis(1)));
        let start = clock.now().total_minutes();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let clock = clock.clone();
                std::thread::spawn(move || {
                    let mut last = 0u64;
                    for _ in 0..20_000 {
                        let now = clock.now();
                        assert!(now.is_valid(), "torn read: {now:?}");
                        let total = now.total_minutes();
                        assert!(total >= last, "time went backwards");
                        last = total;
                    }
                    last
                })
            })
            .collect();

        let writer = {
            let clock = clock.clone();
            std::thread::spawn(move || {
                for _ in 0..5_000 {
                    clock.tick();
                }
            })
        };

        writer.join().unwrap();
        for r in readers {
            let last = r.join().unwrap();
            assert!(last >= start);
        }
        assert_eq!(clock.now().total_minutes(), start + 5_000 * 7);
    }

    #[tokio::test]
    async fn subscribers_get_typed_events() {
        let clock = WorldClock::new(GameTime { day: 1, hour: 5, minute: 55 }, 10, Duration::from_millis(1));
        let mut rx = clock.subscribe();
        for ev in clock.tick() {
            clock.events.send(ev).unwrap();
        }
        assert_eq!(rx.recv().await.unwrap(), ClockEvent::Dawn { day: 1 });
    }
}
