//! Combat domain: AI for enemies and bosses.

pub mod boss;
pub mod enemy;
pub mod utility;

pub use boss::{BossBehavior, BossBrain, BossContext, BossUpdate};
pub use enemy::{BehaviorKind, EnemyBrain, EnemyConfig, EnemyContext, SmartConfig, TargetInfo};
pub use utility::{AiAction, AiContext, DecisionMaker, UtilityAi, curves};
