//! 缓存层
//!
//! 通过插件注册表解耦缓存后端，后端在编译期通过 `declare_object_cache_plugin!`
//! 自注册，启动时按配置名称实例化。当前内置 Moka 内存后端。

pub mod object_cache;
pub mod register;
mod traits;

pub use traits::{CacheResult, ObjectCache};

/// 声明并自注册一个缓存插件
///
/// 插件类型需要提供 `fn new() -> Result<Self, String>`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $plugin:ty) => {
        #[ctor::ctor]
        fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    let fut: $crate::cache::register::BoxedObjectCacheFuture =
                        Box::pin(async {
                            let cache = <$plugin>::new()
                                .map_err($crate::errors::PeerAssessError::cache_connection)?;
                            Ok(Box::new(cache) as Box<dyn $crate::cache::ObjectCache>)
                        });
                    fut
                }),
            );
        }
    };
}
