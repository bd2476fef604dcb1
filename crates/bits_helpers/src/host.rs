//! Message bridge between a bit and the Ribbit host page.
//!
//! The host posts [`RibbitMessage`]s into the page; they are queued and handed to the bit's
//! [`RibbitMessageHandler`] once per frame. Replies go back as [`BitMessage`]s. Outside the
//! browser replies are queued instead, so they can be inspected.

use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

use bevy::prelude::*;
use parking_lot::Mutex;
use ribbit_bits::{BitDuration, BitMessage, BitParameters, BitResult, RibbitMessage};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::MessageEvent;

pub static RIBBIT_MESSAGE_QUEUE: LazyLock<Arc<Mutex<Vec<RibbitMessage>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

#[cfg(not(target_arch = "wasm32"))]
pub static BIT_MESSAGE_QUEUE: LazyLock<Arc<Mutex<Vec<BitMessage>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

/// What a bit must answer when the host talks to it.
///
/// These run with exclusive world access from the host bridge; the bit itself never calls them.
pub trait RibbitMessageHandler: Send + Sync + Default + 'static {
    fn duration(world: &mut World) -> BitDuration;
    fn end(world: &mut World) -> BitResult;
    fn restart(world: &mut World);
}

#[derive(Default)]
pub struct HostCommunicationPlugin<T: RibbitMessageHandler>(PhantomData<T>);

impl<T: RibbitMessageHandler> Plugin for HostCommunicationPlugin<T> {
    fn build(&self, app: &mut App) {
        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, listen_host_messages);

        app.add_systems(PostStartup, announce_ready)
            .add_systems(PostUpdate, dispatch_host_messages::<T>);
    }
}

#[cfg(target_arch = "wasm32")]
fn listen_host_messages() {
    let Some(browser) = web_sys::window() else {
        error!("No browser window, host messages will not be received");
        return;
    };

    let on_message = Closure::wrap(Box::new(|event: MessageEvent| {
        match serde_wasm_bindgen::from_value::<RibbitMessage>(event.data()) {
            Ok(message) => RIBBIT_MESSAGE_QUEUE.lock().push(message),
            Err(err) => warn!("Ignoring host message {:?}: {err}", event.data()),
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Err(err) =
        browser.add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
    {
        error!("Could not listen to host messages: {err:?}");
        return;
    }

    // the listener lives as long as the page
    on_message.forget();
}

#[cfg(not(target_arch = "wasm32"))]
pub fn send_bit_message(message: BitMessage) {
    BIT_MESSAGE_QUEUE.lock().push(message);
}

#[cfg(target_arch = "wasm32")]
pub fn send_bit_message(message: BitMessage) {
    let Ok(payload) = serde_wasm_bindgen::to_value(&message) else {
        error!("Could not serialize {message:?}");
        return;
    };
    let Some(parent) = web_sys::window().and_then(|browser| browser.parent().ok().flatten())
    else {
        error!("{message:?} not sent, no parent window");
        return;
    };
    if let Err(err) = parent.post_message(&payload, "*") {
        error!("Could not post {message:?}: {err:?}");
    }
}

fn announce_ready() {
    send_bit_message(BitMessage::Ready);
}

fn dispatch_host_messages<T: RibbitMessageHandler>(world: &mut World) {
    let messages: Vec<_> = RIBBIT_MESSAGE_QUEUE.lock().drain(..).collect();

    for message in messages {
        match message {
            RibbitMessage::Parameters => {
                let duration = T::duration(world);
                send_bit_message(BitMessage::Parameters(BitParameters { duration }));
            }
            RibbitMessage::End => {
                let result = T::end(world);
                send_bit_message(BitMessage::End(result));
            }
            RibbitMessage::Restart => T::restart(world),
            // bits start on their own once loaded
            RibbitMessage::Start => {}
        }
    }
}
