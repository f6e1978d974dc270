#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test_case(0x01, Some(WakeupMessage::Ping) ; "ping")]
#[test_case(0x02, Some(WakeupMessage::ConnectionEstablished) ; "connection established")]
#[test_case(0x03, Some(WakeupMessage::RecoveryAborted) ; "recovery aborted")]
#[test_case(0x00, None ; "zero")]
#[test_case(0xff, None ; "unknown")]
fn WakeupMessage___from_byte___decodes_known_values(byte: u8, expected: Option<WakeupMessage>) {
    assert_eq!(WakeupMessage::from_byte(byte), expected);
}

#[test]
fn WakeupMessage___as_byte___inverse_of_from_byte() {
    for message in [
        WakeupMessage::Ping,
        WakeupMessage::ConnectionEstablished,
        WakeupMessage::RecoveryAborted,
    ] {
        assert_eq!(WakeupMessage::from_byte(message.as_byte()), Some(message));
    }
}

#[tokio::test]
async fn WakeupReceiver___drain_after_sends___returns_messages_in_order() {
    let (sender, mut receiver) = wakeup_pipe().unwrap();

    sender.send(WakeupMessage::Ping).unwrap();
    sender.send(WakeupMessage::ConnectionEstablished).unwrap();
    sender.clone().send(WakeupMessage::Ping).unwrap();

    let messages = receiver.recv().await.unwrap();

    assert_eq!(
        messages,
        vec![
            WakeupMessage::Ping,
            WakeupMessage::ConnectionEstablished,
            WakeupMessage::Ping
        ]
    );
}

#[tokio::test]
async fn WakeupReceiver___drain_when_empty___returns_no_messages() {
    let (_sender, mut receiver) = wakeup_pipe().unwrap();

    let messages = receiver.drain().unwrap();

    assert!(messages.is_empty());
}

#[tokio::test]
async fn WakeupReceiver___unknown_byte___skipped() {
    let (sender, mut receiver) = wakeup_pipe().unwrap();
    // Write a byte outside the enumeration straight to the pipe.
    let written = (&*sender.inner).write(&[0x7f]).unwrap();
    assert_eq!(written, 1);
    sender.send(WakeupMessage::Ping).unwrap();

    let messages = receiver.recv().await.unwrap();

    assert_eq!(messages, vec![WakeupMessage::Ping]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn WakeupSender___send_right_after_creation___accepted_without_waiting() {
    let (sender, mut receiver) = wakeup_pipe().unwrap();

    sender.send(WakeupMessage::Ping).unwrap();

    assert_eq!(receiver.recv().await.unwrap(), vec![WakeupMessage::Ping]);
}

#[test]
fn WakeupSender___send_from_thread_outside_runtime___accepted() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let (sender, mut receiver) = runtime.block_on(async { wakeup_pipe() }).unwrap();

    std::thread::spawn(move || sender.send(WakeupMessage::ConnectionEstablished))
        .join()
        .unwrap()
        .unwrap();

    let messages = runtime.block_on(receiver.recv()).unwrap();
    assert_eq!(messages, vec![WakeupMessage::ConnectionEstablished]);
}

#[tokio::test]
async fn WakeupReceiver___all_senders_dropped___reports_closed() {
    let (sender, mut receiver) = wakeup_pipe().unwrap();
    drop(sender);

    let result = receiver.recv().await;

    assert!(matches!(result, Err(RecoveryError::PipeClosed)));
}

#[tokio::test]
async fn WakeupSender___receiver_dropped___send_fails_without_panicking() {
    let (sender, receiver) = wakeup_pipe().unwrap();
    drop(receiver);

    let result = sender.send(WakeupMessage::Ping);

    assert!(result.is_err());
}

#[tokio::test]
async fn WakeupSender___concurrent_producers___every_byte_arrives() {
    let (sender, mut receiver) = wakeup_pipe().unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let sender = sender.clone();
            tokio::spawn(async move { sender.send(WakeupMessage::Ping).unwrap() })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let mut total = 0;
    while total < 8 {
        total += receiver.recv().await.unwrap().len();
    }
    assert_eq!(total, 8);
}
