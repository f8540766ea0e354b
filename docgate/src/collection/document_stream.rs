use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::collection::Document;
use crate::common::async_task;
use crate::errors::ErrorKind;
use crate::store::DocumentCursor;

/// A handle that cancels an in-flight [DocumentStream].
///
/// Cloned freely and callable from any thread. Cancellation is cooperative:
/// the producer observes it between successive cursor-advance steps, so an
/// in-flight store read is never preempted. Invoking the handle more than
/// once is a no-op.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    fn new() -> CancelHandle {
        CancelHandle {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests cancellation of the stream this handle belongs to.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// An asynchronous delivery sequence of documents.
///
/// Created by [find_as_stream]. Exactly one detached producer pulls from
/// the store cursor and pushes decoded documents into a bounded delivery
/// queue; the stream is the consuming end. Documents arrive in the cursor's
/// natural iteration order, with no reordering or batching beyond the
/// queue's capacity. A capacity of 0 makes every delivery a synchronous hand-off
/// between producer and consumer.
///
/// The sequence ends when the cursor is exhausted or the [CancelHandle] is
/// invoked; after cancellation no further documents are delivered and
/// iteration simply returns `None`. Dropping the stream cancels the
/// producer, so abandoning a partially consumed stream can never leak the
/// worker.
///
/// [find_as_stream]: crate::collection::Collection::find_as_stream
pub struct DocumentStream {
    receiver: Option<Receiver<Document>>,
    cancel: CancelHandle,
}

impl DocumentStream {
    /// Spawns the producer for `cursor` and returns the consuming stream.
    pub(crate) fn spawn(cursor: DocumentCursor, capacity: usize) -> DocumentStream {
        let (sender, receiver) = bounded(capacity);
        let cancel = CancelHandle::new();

        let producer_cancel = cancel.clone();
        async_task(move || produce(cursor, sender, producer_cancel));

        DocumentStream {
            receiver: Some(receiver),
            cancel,
        }
    }

    /// Returns a handle that cancels this stream.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}

impl Iterator for DocumentStream {
    type Item = Document;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.is_cancelled() {
            // Dropping the receiver unblocks a producer parked on a full
            // queue; nothing already in flight is delivered after this.
            self.receiver = None;
            return None;
        }
        let receiver = self.receiver.as_ref()?;
        match receiver.recv() {
            Ok(document) => Some(document),
            Err(_) => {
                self.receiver = None;
                None
            }
        }
    }
}

impl Drop for DocumentStream {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.receiver = None;
    }
}

fn produce(mut cursor: DocumentCursor, sender: Sender<Document>, cancel: CancelHandle) {
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let Some(item) = cursor.next() else {
            break;
        };
        match item {
            Ok(document) => {
                if sender.send(document).is_err() {
                    // consumer went away
                    break;
                }
            }
            Err(err) if err.kind() == &ErrorKind::DecodeFailure => {
                log::warn!("Skipping undecodable record in stream: {}", err);
            }
            Err(err) => {
                log::error!("Stream cursor failed, closing delivery queue: {}", err);
                break;
            }
        }
    }
    // sender drops here, closing the queue
}
