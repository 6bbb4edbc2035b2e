use std::fmt;
use std::panic::{self, AssertUnwindSafe};

type Work<T, R, E> = Box<dyn FnOnce(T) -> Result<R, E> + Send>;

/// A unit of work: an identifier, its input, and the function to run on it
pub struct Task<T, R, E> {
    pub id: usize,
    input: T,
    work: Work<T, R, E>,
}

impl<T, R, E> Task<T, R, E> {
    pub fn new<F>(id: usize, input: T, work: F) -> Self
    where
        F: FnOnce(T) -> Result<R, E> + Send + 'static,
    {
        Self {
            id,
            input,
            work: Box::new(work),
        }
    }

    /// Execute the task, converting a panic into a [`TaskFailure::Panic`]
    pub(crate) fn run(self) -> Result<TaskResult<R>, TaskError<E>> {
        let Task { id, input, work } = self;
        match panic::catch_unwind(AssertUnwindSafe(move || work(input))) {
            Ok(Ok(value)) => Ok(TaskResult { id, value }),
            Ok(Err(error)) => Err(TaskError {
                id,
                failure: TaskFailure::Error(error),
            }),
            Err(payload) => Err(TaskError {
                id,
                failure: TaskFailure::Panic(panic_message(payload.as_ref())),
            }),
        }
    }
}

impl<T, R, E> fmt::Debug for Task<T, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

/// Output of a successful task, tagged with the task's id
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult<R> {
    pub id: usize,
    pub value: R,
}

/// Failure of a task, tagged with the task's id
#[derive(Debug)]
pub struct TaskError<E> {
    pub id: usize,
    pub failure: TaskFailure<E>,
}

#[derive(Debug)]
pub enum TaskFailure<E> {
    /// The task returned an error
    Error(E),
    /// The task panicked; holds the panic message
    Panic(String),
}

impl<E: fmt::Display> fmt::Display for TaskFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFailure::Error(e) => write!(f, "{}", e),
            TaskFailure::Panic(msg) => write!(f, "panicked: {}", msg),
        }
    }
}

impl<E: fmt::Display> fmt::Display for TaskError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {} {}", self.id, self.failure)
    }
}
