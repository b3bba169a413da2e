//! Ping-pong demo.
//!
//! A pair of `Pinger`s each supervise two `Ponger`s and bounce a counter
//! back and forth until the ping budget is spent, then stop themselves.
//! The system shuts down on its own once the last pinger is gone; Ctrl-C
//! also works at any point.

// Layer 1: Standard library imports
use std::error::Error;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use troupe_rt::actor::{Actor, ActorContext, ActorError, ActorRef};
use troupe_rt::message::{Message, MessageType, STOPPED};
use troupe_rt::system::{ActorSystem, SystemConfig};

static PING: MessageType = MessageType::new("Ping");
static PONG: MessageType = MessageType::new("Pong");

#[derive(Debug)]
struct Ping {
    num: u64,
}

#[derive(Debug)]
struct Pong {
    num: u64,
}

struct Pinger {
    max_pings: u64,
    num_pongers: usize,
    num_pings: u64,
    curr_ponger: usize,
    pongers: Vec<Option<ActorRef>>,
}

impl Pinger {
    fn new(max_pings: u64, num_pongers: usize) -> Self {
        Self {
            max_pings,
            num_pongers,
            num_pings: 0,
            curr_ponger: 0,
            pongers: Vec::new(),
        }
    }
}

impl Actor for Pinger {
    fn on_start(&mut self, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
        for i in 0..self.num_pongers {
            let ponger = ctx.spawn_child(format!("{}/Ponger-{i}", ctx.name()), Ponger)?;
            ctx.send(&ponger, &PING, Some(Box::new(Ping { num: 0 })))?;
            self.pongers.push(Some(ponger));
        }
        Ok(())
    }

    fn on_receive(&mut self, msg: &Message, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
        if msg.is(&PONG) {
            if self.num_pings >= self.max_pings {
                ctx.stop_self();
                return Ok(());
            }
            self.num_pings += 1;

            loop {
                self.curr_ponger = (self.curr_ponger + 1) % self.pongers.len();
                if self.pongers[self.curr_ponger].is_some() {
                    break;
                }
            }
            if let Some(ponger) = &self.pongers[self.curr_ponger] {
                ctx.send(
                    ponger,
                    &PING,
                    Some(Box::new(Ping {
                        num: self.num_pings,
                    })),
                )?;
            }
        } else if msg.is(&STOPPED) {
            if let Some(sender) = msg.sender() {
                for slot in &mut self.pongers {
                    if slot.as_ref() == Some(sender) {
                        *slot = None;
                    }
                }
            }
        }
        Ok(())
    }

    fn on_stop(&mut self, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
        println!("{} finished after {} pings", ctx.name(), self.num_pings);
        Ok(())
    }
}

struct Ponger;

impl Actor for Ponger {
    fn on_receive(&mut self, msg: &Message, ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
        if msg.is(&PING) {
            if let (Some(ping), Some(sender)) = (msg.payload::<Ping>(), msg.sender()) {
                ctx.send(sender, &PONG, Some(Box::new(Pong { num: ping.num })))?;
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = SystemConfig::builder().with_num_workers(4).build()?;
    let system = ActorSystem::new(config)?;

    for i in 0..2 {
        system.spawn(format!("Pinger-{i}"), Pinger::new(100_000, 2))?;
    }

    system.wait_children()?;
    println!("actor system stopped");
    Ok(())
}
