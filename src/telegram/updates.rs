use std::{
    ops::ControlFlow,
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
};

use tdlib_rs::enums::{AuthorizationState, Update};

const UPDATE_PUMP_SHUTDOWN_FAILED: &str = "TDLIB_UPDATE_PUMP_SHUTDOWN_FAILED";

/// Drains the native update queue on a worker thread and forwards
/// authorization-state changes of one client.
///
/// `tdlib_rs::receive` also completes pending requests, so the pump has to run
/// for as long as the client is used.
#[derive(Debug)]
pub struct UpdatePump {
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl UpdatePump {
    pub fn start(client_id: i32, states: Sender<AuthorizationState>) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker = thread::Builder::new()
            .name("telertx-tdlib-updates".to_owned())
            .spawn(move || run_pump(client_id, states, stop_rx))?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }
}

impl Drop for UpdatePump {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(worker) = self.worker.take() {
            if let Err(error) = worker.join() {
                tracing::warn!(
                    code = UPDATE_PUMP_SHUTDOWN_FAILED,
                    error = ?error,
                    "tdlib update pump panicked on shutdown"
                );
            }
        }
    }
}

fn run_pump(client_id: i32, states: Sender<AuthorizationState>, stop_rx: Receiver<()>) {
    loop {
        if !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty)) {
            break;
        }

        let Some((update, update_client_id)) = tdlib_rs::receive() else {
            continue;
        };

        if update_client_id != client_id {
            continue;
        }

        if route_update(update, &states).is_break() {
            break;
        }
    }

    tracing::debug!(client_id, "tdlib update pump stopped");
}

fn route_update(update: Update, states: &Sender<AuthorizationState>) -> ControlFlow<()> {
    match update {
        Update::AuthorizationState(update) => {
            if states.send(update.authorization_state).is_err() {
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        }
        other => {
            tracing::trace!(update = ?other, "unobserved engine update");
            ControlFlow::Continue(())
        }
    }
}
