use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures_util::future::{FutureExt, LocalBoxFuture, Shared};

type SharedLoad<T, E> = Shared<LocalBoxFuture<'static, Result<Rc<T>, E>>>;

enum CacheSlot<T, E> {
    Empty,
    Loading(SharedLoad<T, E>),
    Ready(Rc<T>),
}

/// Load-once cache for a value fetched asynchronously on a single thread.
///
/// Callers arriving while a load is in flight await that same load. A
/// successful result is kept for the life of the cache; a failure is handed to
/// every waiter and leaves the cache empty so a later call loads again.
pub struct CatalogCache<T, E> {
    slot: Rc<RefCell<CacheSlot<T, E>>>,
}

impl<T, E> Clone for CatalogCache<T, E> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T, E> Default for CatalogCache<T, E> {
    fn default() -> Self {
        Self {
            slot: Rc::new(RefCell::new(CacheSlot::Empty)),
        }
    }
}

impl<T: 'static, E: Clone + 'static> CatalogCache<T, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<Rc<T>> {
        match &*self.slot.borrow() {
            CacheSlot::Ready(value) => Some(Rc::clone(value)),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(&*self.slot.borrow(), CacheSlot::Loading(_))
    }

    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Rc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + 'static,
    {
        let pending = {
            let mut slot = self.slot.borrow_mut();
            let in_flight = match &*slot {
                CacheSlot::Ready(value) => return Ok(Rc::clone(value)),
                CacheSlot::Loading(pending) => Some(pending.clone()),
                CacheSlot::Empty => None,
            };
            match in_flight {
                Some(pending) => pending,
                None => {
                    let pending = load()
                        .map(|result| result.map(Rc::new))
                        .boxed_local()
                        .shared();
                    *slot = CacheSlot::Loading(pending.clone());
                    pending
                }
            }
        };
        let result = pending.clone().await;
        let mut slot = self.slot.borrow_mut();
        let owns_slot = matches!(&*slot, CacheSlot::Loading(current) if current.ptr_eq(&pending));
        if owns_slot {
            *slot = match &result {
                Ok(value) => CacheSlot::Ready(Rc::clone(value)),
                Err(_) => CacheSlot::Empty,
            };
        }
        result
    }
}
