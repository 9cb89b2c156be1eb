/*!
 * Request-scoped context values
 *
 * Responsibility:
 * - 上流 middleware が request extensions に載せる値の型定義
 * - TxContext はログ相関専用。認可判定には使わない
 */

mod resource;
mod tx;

pub use resource::ResourceDetail;
pub use tx::TxContext;
