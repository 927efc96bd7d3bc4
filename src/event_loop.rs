use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// The poll interval elapsed, or a burst of input was drained.
    Tick,
    Input(Event),
}

/// Single-threaded message pump for the demo.
///
/// Every iteration starts with a `Tick` so periodic work (status updates,
/// redraws) runs even when no input arrives. Input is drained in bursts so a
/// held key does not starve the tick.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn set_poll_interval(&mut self, poll_interval: Duration) {
        self.poll_interval = poll_interval;
    }

    /// Run until the handler returns `ControlFlow::Quit`.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(LoopEvent) -> io::Result<ControlFlow>,
    {
        loop {
            if handler(LoopEvent::Tick)? == ControlFlow::Quit {
                return Ok(());
            }
            if !self.driver.poll(self.poll_interval)? {
                continue;
            }
            loop {
                let event = self.driver.read()?;
                if handler(LoopEvent::Input(event))? == ControlFlow::Quit {
                    return Ok(());
                }
                if !self.driver.poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedInput;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn input_burst_is_drained_before_next_tick() {
        let mut event_loop = EventLoop::new(
            ScriptedInput::new([key('a'), key('b'), key('q')]),
            Duration::ZERO,
        );
        let mut seen = Vec::new();
        event_loop
            .run(|event| {
                let quit = event == LoopEvent::Input(key('q'));
                seen.push(event);
                Ok(if quit {
                    ControlFlow::Quit
                } else {
                    ControlFlow::Continue
                })
            })
            .unwrap();
        assert_eq!(
            seen,
            vec![
                LoopEvent::Tick,
                LoopEvent::Input(key('a')),
                LoopEvent::Input(key('b')),
                LoopEvent::Input(key('q')),
            ]
        );
        assert_eq!(event_loop.driver().remaining(), 0);
    }

    #[test]
    fn ticks_keep_coming_without_input() {
        let mut event_loop = EventLoop::new(ScriptedInput::default(), Duration::ZERO);
        let mut ticks = 0;
        event_loop
            .run(|event| {
                assert_eq!(event, LoopEvent::Tick);
                ticks += 1;
                Ok(if ticks == 3 {
                    ControlFlow::Quit
                } else {
                    ControlFlow::Continue
                })
            })
            .unwrap();
        assert_eq!(ticks, 3);
    }

    #[test]
    fn handler_errors_stop_the_loop() {
        let mut event_loop = EventLoop::new(ScriptedInput::default(), Duration::ZERO);
        let result = event_loop.run(|_| Err(io::Error::other("draw failed")));
        assert!(result.is_err());
    }
}
