//! Middleware chain execution
//!
//! Middleware run strictly in order, each one only after its predecessor has
//! completed, and the controller runs once all of them have. Any middleware
//! may halt the chain after answering the request itself.

use crate::error::DispatchError;
use crate::http::Exchange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    Halt,
}

/// One step of a chain: a middleware or the final controller
#[allow(async_fn_in_trait)]
pub trait Stage<C> {
    async fn run(&self, exchange: &mut Exchange, ctx: &C) -> Result<Flow, DispatchError>;
}

pub async fn run_chain<C, M, H>(
    middlewares: &[M],
    controller: &H,
    exchange: &mut Exchange,
    ctx: &C,
) -> Result<(), DispatchError>
where
    M: Stage<C>,
    H: Stage<C>,
{
    for middleware in middlewares {
        if middleware.run(exchange, ctx).await? == Flow::Halt {
            return Ok(());
        }
    }
    controller.run(exchange, ctx).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Bytes;
    use hyper::{HeaderMap, Method, StatusCode, Uri};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        delay_ms: u64,
        outcome: Outcome,
        log: Log,
    }

    #[derive(Clone, Copy)]
    enum Outcome {
        Next,
        Halt,
        Fail,
    }

    impl Recorder {
        fn new(name: &'static str, delay_ms: u64, log: &Log) -> Self {
            Self {
                name,
                delay_ms,
                outcome: Outcome::Next,
                log: Rc::clone(log),
            }
        }

        const fn with(mut self, outcome: Outcome) -> Self {
            self.outcome = outcome;
            self
        }
    }

    impl Stage<()> for Recorder {
        async fn run(&self, exchange: &mut Exchange, _ctx: &()) -> Result<Flow, DispatchError> {
            self.log.borrow_mut().push(format!("{}:start", self.name));
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            self.log.borrow_mut().push(format!("{}:end", self.name));
            match self.outcome {
                Outcome::Next => Ok(Flow::Next),
                Outcome::Halt => {
                    exchange.send_text(StatusCode::UNAUTHORIZED, "halted");
                    Ok(Flow::Halt)
                }
                Outcome::Fail => Err(DispatchError::Response("boom".to_string())),
            }
        }
    }

    fn exchange() -> Exchange {
        Exchange::new(
            Method::GET,
            &Uri::from_static("/ping-with-auth"),
            HeaderMap::new(),
            Bytes::new(),
        )
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[tokio::test]
    async fn test_each_step_waits_for_its_predecessor() {
        let log = Log::default();
        // The slow first middleware must finish before b or h begin, and the
        // quick b must finish before h begins.
        let middlewares = [Recorder::new("a", 30, &log), Recorder::new("b", 5, &log)];
        let controller = Recorder::new("h", 0, &log);

        run_chain(&middlewares, &controller, &mut exchange(), &())
            .await
            .unwrap();

        assert_eq!(
            entries(&log),
            vec!["a:start", "a:end", "b:start", "b:end", "h:start", "h:end"]
        );
    }

    #[tokio::test]
    async fn test_without_middleware_runs_controller() {
        let log = Log::default();
        let controller = Recorder::new("h", 0, &log);

        run_chain::<(), Recorder, Recorder>(&[], &controller, &mut exchange(), &())
            .await
            .unwrap();

        assert_eq!(entries(&log), vec!["h:start", "h:end"]);
    }

    #[tokio::test]
    async fn test_halt_skips_remaining_steps() {
        let log = Log::default();
        let middlewares = [
            Recorder::new("a", 0, &log).with(Outcome::Halt),
            Recorder::new("b", 0, &log),
        ];
        let controller = Recorder::new("h", 0, &log);
        let mut ex = exchange();

        run_chain(&middlewares, &controller, &mut ex, &())
            .await
            .unwrap();

        assert_eq!(entries(&log), vec!["a:start", "a:end"]);
        assert_eq!(ex.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_error_stops_chain() {
        let log = Log::default();
        let middlewares = [
            Recorder::new("a", 0, &log),
            Recorder::new("b", 0, &log).with(Outcome::Fail),
        ];
        let controller = Recorder::new("h", 0, &log);

        let result = run_chain(&middlewares, &controller, &mut exchange(), &()).await;

        assert!(result.is_err());
        assert_eq!(entries(&log), vec!["a:start", "a:end", "b:start", "b:end"]);
    }
}
