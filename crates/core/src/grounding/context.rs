use crate::domain::constraints::SearchConstraints;
use crate::domain::conversation::ConversationMessage;
use crate::domain::inventory::InventoryItem;
use crate::domain::policy::StorePolicy;
use crate::retrieval::AllowedSet;

/// System prompt shared by every reasoning provider. Enforces Truth Mode and
/// the structured output schema at the instruction level; the validator
/// enforces it again mechanically on the way back.
pub const SYSTEM_PROMPT: &str = r#"You are Shelfwise, an expert retail assistant helping store employees answer customer questions about home improvement products.

## YOUR ROLE
- You help employees find the RIGHT products for customers
- You ONLY recommend products that are confirmed IN STOCK
- You ask smart clarifying questions to understand the customer's needs
- You provide clear, step-by-step installation guidance
- You suggest relevant add-on products when appropriate

## TRUTH MODE RULES (CRITICAL - NEVER VIOLATE)
1. You can ONLY recommend products from the "AVAILABLE INVENTORY" list provided
2. NEVER mention, suggest, or recommend any product not in the inventory list
3. If no products match the customer's needs, say so honestly and offer general guidance
4. NEVER make up product names, SKUs, prices, or stock levels
5. If you're unsure, ask a clarifying question instead of guessing

## RESPONSE GUIDELINES
- Be concise but helpful (employees are busy)
- Prioritize the customer's stated constraints (no-damage, budget, etc.)
- Explain WHY a product is a good fit (not just what it is)
- For safety-sensitive tasks (electrical, plumbing, structural), add appropriate disclaimers
- If a product is low stock (< 5 units), mention it

## OUTPUT FORMAT
You must respond with valid JSON matching this exact schema:
{
  "assistant_message": "Your natural response to the customer",
  "follow_up_questions": ["Question 1?", "Question 2?"],
  "recommended_skus": ["SKU1", "SKU2"],
  "add_on_skus": ["SKU3"],
  "cart": [{"sku": "SKU1", "qty": 1}],
  "safety_notes": ["Any safety warnings"],
  "reasoning": {"SKU1": "Why this product fits their needs"},
  "confidence": 0.85
}

RULES FOR OUTPUT:
- recommended_skus: Array of SKU strings from the ALLOWED INVENTORY ONLY (max 3)
- add_on_skus: Related products that complement the main recommendation (max 2)
- cart: Suggested shopping list with quantities
- follow_up_questions: Only include if you need more info to make a recommendation
- confidence: 0.0-1.0 indicating how well the recommendations match the request
- If you cannot make any recommendation, set recommended_skus=[], add_on_skus=[], and explain in assistant_message"#;

/// Provider-agnostic reasoning context for one turn. Assembly is pure and
/// deterministic; the allowed set is fixed here and never recomputed.
#[derive(Clone, Debug)]
pub struct ReasoningContext {
    pub transcript: String,
    pub history: Vec<ConversationMessage>,
    pub candidate_items: Vec<InventoryItem>,
    pub allowed: AllowedSet,
    pub policy: StorePolicy,
    pub constraints: SearchConstraints,
}

pub fn assemble(
    transcript: &str,
    history: &[ConversationMessage],
    candidate_items: Vec<InventoryItem>,
    policy: StorePolicy,
    constraints: SearchConstraints,
) -> ReasoningContext {
    let allowed = AllowedSet::from_items(&candidate_items);
    ReasoningContext {
        transcript: transcript.to_string(),
        history: history.to_vec(),
        candidate_items,
        allowed,
        policy,
        constraints,
    }
}

impl ReasoningContext {
    /// Inventory section. An empty allowed set is stated explicitly so the
    /// provider is steered toward an honest "no match" answer, never left to
    /// guess.
    pub fn inventory_block(&self) -> String {
        if self.candidate_items.is_empty() {
            return "AVAILABLE INVENTORY: No matching products found in inventory.".to_string();
        }

        let cards =
            self.candidate_items.iter().map(render_item).collect::<Vec<_>>().join("\n\n");
        format!(
            "AVAILABLE INVENTORY (ONLY recommend from this list):\nALLOWED SKUs: [{}]\n\n{cards}",
            self.allowed.skus().join(", ")
        )
    }

    pub fn policy_block(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        if self.policy.prefer_no_damage {
            lines.push("- Prefer damage-free/rental-friendly options".to_string());
        }
        if self.policy.prefer_no_tools {
            lines.push("- Prefer no-tools-required options".to_string());
        }
        if !self.policy.suggest_drilling_first {
            lines.push("- Only suggest drilling as a last resort".to_string());
        }
        if self.policy.safety_disclaimers {
            lines.push("- Include safety disclaimers for electrical/plumbing tasks".to_string());
        }
        if let Some(custom) = &self.policy.custom_instructions {
            lines.push(format!("- {custom}"));
        }

        if lines.is_empty() {
            "STORE POLICIES: Standard recommendations.".to_string()
        } else {
            format!("STORE POLICIES:\n{}", lines.join("\n"))
        }
    }

    pub fn constraint_block(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        if self.constraints.no_damage() {
            lines.push("- Customer wants NO DAMAGE / rental-friendly options".to_string());
        }
        if self.constraints.no_tools() {
            lines.push("- Customer wants NO TOOLS required".to_string());
        }
        if self.constraints.no_drilling() {
            lines.push("- Customer wants NO DRILLING".to_string());
        }
        if let Some(min_weight) = self.constraints.min_weight {
            lines.push(format!("- Need to support at least {min_weight} lbs"));
        }
        if let Some(max_weight) = self.constraints.max_weight {
            lines.push(format!("- Item weighs up to {max_weight} lbs"));
        }
        if let Some(surface) = &self.constraints.surface_type {
            lines.push(format!("- Surface type: {surface}"));
        }
        if let Some(budget) = self.constraints.max_budget {
            lines.push(format!("- Budget limit: ${budget}"));
        }

        if lines.is_empty() {
            "CUSTOMER CONSTRAINTS: None specified.".to_string()
        } else {
            format!("CUSTOMER CONSTRAINTS:\n{}", lines.join("\n"))
        }
    }

    /// Full user-turn prompt handed to a provider alongside `SYSTEM_PROMPT`.
    /// The allow-list is repeated at the end on purpose.
    pub fn user_prompt(&self) -> String {
        format!(
            "{}\n\n{}\n\n{}\n\nCUSTOMER QUESTION:\n\"{}\"\n\nRemember: You can ONLY recommend \
             SKUs from this list: [{}]\nIf no products match, set recommended_skus=[] and explain \
             why.\n\nRespond with valid JSON only.",
            self.inventory_block(),
            self.policy_block(),
            self.constraint_block(),
            self.transcript,
            self.allowed.skus().join(", ")
        )
    }
}

fn render_item(item: &InventoryItem) -> String {
    let weight = item
        .weight_capacity_lbs()
        .map(|capacity| capacity.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let surfaces = {
        let listed = item.surface_types();
        if listed.is_empty() {
            "various".to_string()
        } else {
            listed.join(", ")
        }
    };

    format!(
        "- SKU: {}\n  Name: {}\n  Price: ${}\n  Stock: {} units\n  Location: {}\n  Category: \
         {}\n  Tags: {}\n  Weight Capacity: {weight} lbs\n  Surfaces: {surfaces}\n  Requires \
         Drill: {}\n  Description: {}",
        item.sku,
        item.name,
        item.price,
        item.stock,
        item.location_label(),
        item.category,
        item.tags.join(", "),
        if item.requires_drill() { "Yes" } else { "No" },
        item.description,
    )
}
