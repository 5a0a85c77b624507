//! Canned action recommendations per lifecycle stage.
//!
//! Pure lookup: the output depends only on the stage and the sign of the
//! net cash flow. Message text is what the dashboard shows verbatim.

use crate::schema::{CompanyRecord, LifecycleStage};

const FALLBACK: &str = "Não há recomendações específicas para o perfil desta empresa no momento. \
     Continue monitorando os KPIs.";

/// Returns the fixed, ordered recommendation list for a stage. `Início`
/// gains one extra message when the net cash flow is positive; an unknown
/// stage yields a single fallback message.
pub fn generate_recommendations(stage: LifecycleStage, fluxo_caixa: f64) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();

    match stage {
        LifecycleStage::Declinio => {
            recommendations.push(
                "**Revisão de Custos:** O fluxo de caixa está consistentemente negativo. \
                 Recomenda-se uma análise detalhada do `Total Pago` para identificar \
                 oportunidades de redução de custos e renegociação com fornecedores."
                    .to_string(),
            );
            recommendations.push(
                "**Retenção de Clientes:** O número de transações e clientes únicos pode estar \
                 caindo. Sugere-se focar em estratégias de **retenção** dos clientes atuais, \
                 que é mais barato do que adquirir novos."
                    .to_string(),
            );
            recommendations.push(
                "**Análise de Portfólio:** Avalie o portfólio de produtos/serviços para focar \
                 nos mais lucrativos e otimizar ou descontinuar os que geram prejuízo, \
                 impactando diretamente o `ticket_medio_recebido`."
                    .to_string(),
            );
        }
        LifecycleStage::Inicio => {
            recommendations.push(
                "**Validação de Mercado:** O foco principal deve ser a **aquisição de novos \
                 clientes** para validar o modelo de negócio e aumentar a base de receita \
                 (`num_clientes_unicos`)."
                    .to_string(),
            );
            recommendations.push(
                "**Gestão de Caixa:** O fluxo de caixa é o ponto mais crítico nesta fase. \
                 Mantenha um controle rigoroso sobre as despesas para garantir a sobrevivência \
                 e a longevidade da operação."
                    .to_string(),
            );
            if fluxo_caixa > 0.0 {
                recommendations.push(
                    "**Reinvestimento Inteligente:** O fluxo de caixa positivo é um ótimo \
                     sinal. Considere reinvestir de forma controlada em canais de marketing e \
                     vendas que demonstrem maior retorno."
                        .to_string(),
                );
            }
        }
        LifecycleStage::Expansao => {
            recommendations.push(
                "**Escalar Operações:** O número de clientes está crescendo rapidamente. \
                 Garanta que a operação (logística, atendimento, tecnologia) consiga suportar \
                 essa nova demanda para não comprometer a qualidade do serviço."
                    .to_string(),
            );
            recommendations.push(
                "**Otimização do Funil de Vendas:** Aproveite o momento para investir em \
                 marketing e vendas e acelerar ainda mais a aquisição de clientes. Monitore o \
                 Custo de Aquisição de Cliente (CAC)."
                    .to_string(),
            );
            recommendations.push(
                "**Análise de Rentabilidade:** Analise a rentabilidade dos novos clientes. O \
                 `ticket_medio_recebido` está se mantendo ou diminuindo? Foque em adquirir \
                 clientes com maior potencial de valor (Lifetime Value)."
                    .to_string(),
            );
        }
        LifecycleStage::Maturidade => {
            recommendations.push(
                "**Inovação e Novos Mercados:** A base de clientes é sólida, mas o crescimento \
                 é lento. Busque oportunidades de **inovação** no portfólio de produtos ou \
                 explore novos segmentos de mercado para encontrar novas fontes de receita."
                    .to_string(),
            );
            recommendations.push(
                "**Otimização de Processos:** Com um volume alto e estável, o foco deve ser a \
                 eficiência. Automatize processos e otimize a estrutura de custos para \
                 maximizar a margem de lucro."
                    .to_string(),
            );
            recommendations.push(
                "**Cross-sell e Up-sell:** Aumente o valor de cada cliente (Lifetime Value) \
                 através de estratégias de cross-selling (venda de produtos relacionados) e \
                 up-selling (venda de versões mais caras do mesmo produto/serviço)."
                    .to_string(),
            );
        }
        LifecycleStage::Desconhecido => {}
    }

    if recommendations.is_empty() {
        recommendations.push(FALLBACK.to_string());
    }
    recommendations
}

/// Convenience over a company row: stage and net flow come from the record.
pub fn recommendations_for(record: &CompanyRecord) -> Vec<String> {
    generate_recommendations(record.stage(), record.fluxo_caixa_liquido)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declinio_fixed_three_messages() {
        let a = generate_recommendations(LifecycleStage::Declinio, -100.0);
        let b = generate_recommendations(LifecycleStage::Declinio, -100.0);
        assert_eq!(a.len(), 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_inicio_conditional_reinvestment() {
        let negative = generate_recommendations(LifecycleStage::Inicio, -10.0);
        assert_eq!(negative.len(), 2);

        let positive = generate_recommendations(LifecycleStage::Inicio, 50.0);
        assert_eq!(positive.len(), 3);
        assert_eq!(positive[..2], negative[..]);
        assert!(positive[2].contains("Reinvestimento"));

        // Zero flow does not trigger the extra message.
        assert_eq!(generate_recommendations(LifecycleStage::Inicio, 0.0).len(), 2);
    }

    #[test]
    fn test_unknown_stage_fallback() {
        let messages = generate_recommendations(LifecycleStage::Desconhecido, 0.0);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], FALLBACK);
    }

    #[test]
    fn test_all_known_stages_have_messages() {
        for stage in LifecycleStage::KNOWN {
            let messages = generate_recommendations(stage, 1.0);
            assert!(messages.len() >= 2);
            assert_ne!(messages[0], FALLBACK);
        }
    }
}
