//! Reactor-level tests: the full driver over an in-process transport.

use eoslink::message::{Argument, Message, Packet, REPLY_PREFIX};
use eoslink::{
    memory_pair, Console, ConsoleConfig, ConsoleEvent, ConsoleState, MemoryHarness, RecordTarget,
    TransportEvent,
};

async fn next_message(harness: &mut MemoryHarness) -> Message {
    loop {
        match harness.outbound.recv().await {
            Some(Packet::Message(message)) => return message,
            Some(Packet::Batch(mut batch)) => {
                if let Some(first) = batch.drain(..).next() {
                    return first;
                }
            }
            None => panic!("transport closed"),
        }
    }
}

async fn next_message_to(harness: &mut MemoryHarness, address: &str) -> Message {
    loop {
        let message = next_message(harness).await;
        if message.address() == address {
            return message;
        }
    }
}

fn echo_heartbeat(harness: &MemoryHarness, ping: &Message) {
    let reply = Message::new(
        format!("{REPLY_PREFIX}/ping"),
        ping.arguments().to_vec(),
    );
    harness
        .events
        .send(TransportEvent::Packet(reply))
        .expect("reactor alive");
}

async fn wait_for_state(
    events: &mut tokio::sync::mpsc::UnboundedReceiver<ConsoleEvent>,
    state: ConsoleState,
) {
    while let Some(event) = events.recv().await {
        if let ConsoleEvent::StateChanged(reached) = event {
            if reached == state {
                return;
            }
        }
    }
    panic!("event stream ended before reaching {}", state.as_str());
}

#[tokio::test(start_paused = true)]
async fn console_becomes_responsive_and_completes_an_empty_sync() {
    let (transport, mut harness) = memory_pair();
    let (console, mut events) = Console::connect(transport, ConsoleConfig::new("ion"))
        .await
        .expect("connect");

    // Connection triggers an immediate heartbeat.
    let ping = next_message_to(&mut harness, "/eos/ping").await;
    echo_heartbeat(&harness, &ping);
    wait_for_state(&mut events, ConsoleState::Responsive).await;
    assert_eq!(console.state(), ConsoleState::Responsive);

    // Baseline system filters went out exactly once.
    next_message_to(&mut harness, "/eos/filter/add").await;

    console
        .set_targets([RecordTarget::Group].into_iter().collect())
        .expect("set targets");
    next_message_to(&mut harness, "/eos/get/group/count").await;

    harness
        .events
        .send(TransportEvent::Packet(Message::new(
            format!("{REPLY_PREFIX}/get/group/count"),
            vec![Argument::Int(0)],
        )))
        .expect("reactor alive");

    let mut completed = false;
    while let Some(event) = events.recv().await {
        if let ConsoleEvent::SynchronizationComplete(targets) = event {
            assert!(targets.contains(&RecordTarget::Group));
            completed = true;
            break;
        }
    }
    assert!(completed);

    console.disconnect().expect("disconnect");
}

#[tokio::test(start_paused = true)]
async fn version_query_round_trips_through_the_pending_map() {
    let (transport, mut harness) = memory_pair();
    let (console, _events) = Console::connect(transport, ConsoleConfig::new("ion"))
        .await
        .expect("connect");

    let version = console.read_version();
    let respond = async {
        let request = next_message_to(&mut harness, "/eos/get/version").await;
        assert!(request.arguments().is_empty());
        harness
            .events
            .send(TransportEvent::Packet(Message::new(
                format!("{REPLY_PREFIX}/get/version"),
                vec!["3.2.10".into()],
            )))
            .expect("reactor alive");
    };

    let (version, ()) = tokio::join!(version, respond);
    assert_eq!(version.expect("version"), "3.2.10");
}

#[tokio::test(start_paused = true)]
async fn transport_disconnect_fails_outstanding_requests_silently() {
    let (transport, mut harness) = memory_pair();
    let (console, mut events) = Console::connect(transport, ConsoleConfig::new("ion"))
        .await
        .expect("connect");

    let version = console.read_version();
    let drop_link = async {
        next_message_to(&mut harness, "/eos/get/version").await;
        harness
            .events
            .send(TransportEvent::Disconnected)
            .expect("reactor alive");
    };

    let (version, ()) = tokio::join!(version, drop_link);
    assert!(version.is_err());
    wait_for_state(&mut events, ConsoleState::Disconnected).await;
    assert_eq!(console.state(), ConsoleState::Disconnected);
}
