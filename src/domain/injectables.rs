//! 프레임워크/호스트가 자동으로 채우는 주입 인스턴스 레지스트리.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// 타입별 인스턴스 하나를 보관한다. 복제는 `Arc` 복제만큼 가볍다.
#[derive(Clone, Default)]
pub struct InjectableRegistry {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl InjectableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 같은 타입의 기존 인스턴스는 교체된다.
    pub fn register<T: Any + Send + Sync>(&mut self, instance: Arc<T>) {
        self.entries.insert(TypeId::of::<T>(), instance);
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|instance| instance.clone().downcast::<T>().ok())
    }

    /// 바인더용 타입 소거 조회.
    pub fn get_by_id(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.get(&type_id).cloned()
    }

    pub fn remove<T: Any + Send + Sync>(&mut self) -> bool {
        self.entries.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
