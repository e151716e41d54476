//! Lifecycle control over the compiled task set.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use promptfile_engine::{EventNotifier, ExecutionEvent, unix_millis};
use promptfile_registry::ScheduledTask;
use tracing::info;

/// Owns every scheduled task produced by the catalog build, keyed by route
/// path. Tasks start unstarted; `start_all`/`stop_all` toggle every task's
/// running state, `cleanup` stops everything and clears the set.
pub struct TaskManager {
  tasks: Mutex<HashMap<String, Arc<dyn ScheduledTask>>>,
  notifier: Arc<dyn EventNotifier>,
}

impl TaskManager {
  pub fn new(
    tasks: HashMap<String, Arc<dyn ScheduledTask>>,
    notifier: Arc<dyn EventNotifier>,
  ) -> Self {
    Self {
      tasks: Mutex::new(tasks),
      notifier,
    }
  }

  pub fn single(&self, route: &str) -> Option<Arc<dyn ScheduledTask>> {
    self
      .tasks
      .lock()
      .expect("task set lock poisoned")
      .get(route)
      .cloned()
  }

  /// Route paths of all held tasks, sorted.
  pub fn routes(&self) -> Vec<String> {
    let mut routes: Vec<String> = self
      .tasks
      .lock()
      .expect("task set lock poisoned")
      .keys()
      .cloned()
      .collect();
    routes.sort();
    routes
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.lock().expect("task set lock poisoned").is_empty()
  }

  pub fn start_all(&self) {
    let tasks = self.tasks.lock().expect("task set lock poisoned");
    for (route, task) in tasks.iter() {
      task.start();
      self.notifier.notify(ExecutionEvent::TaskStarted {
        route: route.clone(),
        timestamp_ms: unix_millis(),
      });
    }
    info!(count = tasks.len(), "started all tasks");
  }

  pub fn stop_all(&self) {
    let tasks = self.tasks.lock().expect("task set lock poisoned");
    for (route, task) in tasks.iter() {
      task.stop();
      self.notifier.notify(ExecutionEvent::TaskStopped {
        route: route.clone(),
        timestamp_ms: unix_millis(),
      });
    }
    info!(count = tasks.len(), "stopped all tasks");
  }

  /// Stop everything and clear the set. Safe to call repeatedly.
  pub fn cleanup(&self) {
    let mut tasks = self.tasks.lock().expect("task set lock poisoned");
    for (route, task) in tasks.iter() {
      task.stop();
      self.notifier.notify(ExecutionEvent::TaskStopped {
        route: route.clone(),
        timestamp_ms: unix_millis(),
      });
    }
    tasks.clear();
    self.notifier.notify(ExecutionEvent::TaskCleanup {
      timestamp_ms: unix_millis(),
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use promptfile_engine::{ChannelNotifier, NoopNotifier};
  use promptfile_registry::TaskState;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[derive(Default)]
  struct StubTask {
    starts: AtomicUsize,
    stops: AtomicUsize,
  }

  impl ScheduledTask for StubTask {
    fn start(&self) {
      self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {
      self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn state(&self) -> TaskState {
      TaskState::Created
    }
  }

  fn manager_with(
    routes: &[&str],
    notifier: Arc<dyn EventNotifier>,
  ) -> (TaskManager, Vec<Arc<StubTask>>) {
    let mut tasks: HashMap<String, Arc<dyn ScheduledTask>> = HashMap::new();
    let mut stubs = Vec::new();
    for route in routes {
      let stub = Arc::new(StubTask::default());
      stubs.push(stub.clone());
      tasks.insert(route.to_string(), stub);
    }
    (TaskManager::new(tasks, notifier), stubs)
  }

  #[test]
  fn start_all_and_stop_all_reach_every_task() {
    let (manager, stubs) = manager_with(&["/a", "/b"], Arc::new(NoopNotifier));
    manager.start_all();
    manager.stop_all();
    for stub in &stubs {
      assert_eq!(stub.starts.load(Ordering::SeqCst), 1);
      assert_eq!(stub.stops.load(Ordering::SeqCst), 1);
    }
  }

  #[test]
  fn cleanup_stops_clears_and_is_idempotent() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let (manager, stubs) = manager_with(&["/a"], Arc::new(ChannelNotifier::new(tx)));

    manager.cleanup();
    assert!(manager.is_empty());
    assert_eq!(stubs[0].stops.load(Ordering::SeqCst), 1);

    manager.cleanup();
    assert!(manager.is_empty());
    assert_eq!(stubs[0].stops.load(Ordering::SeqCst), 1);

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
      events.push(event);
    }
    // One TaskStopped plus one TaskCleanup per call.
    assert!(matches!(events[0], ExecutionEvent::TaskStopped { .. }));
    assert!(matches!(events[1], ExecutionEvent::TaskCleanup { .. }));
    assert!(matches!(events[2], ExecutionEvent::TaskCleanup { .. }));
  }

  #[test]
  fn single_and_routes_reflect_the_set() {
    let (manager, _) = manager_with(&["/b", "/a"], Arc::new(NoopNotifier));
    assert!(manager.single("/a").is_some());
    assert!(manager.single("/missing").is_none());
    assert_eq!(manager.routes(), vec!["/a".to_string(), "/b".to_string()]);
  }
}
